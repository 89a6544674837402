pub mod billing;
pub mod engagement;
pub mod identity;
pub mod profile;
pub mod property;

pub use billing::{NewPayment, NewSubscription, Payment, PaymentFilter, PaymentStatus, Subscription};
pub use engagement::{
    Conversation, Favorite, Inquiry, InquiryStatus, Message, NewConversation, NewInquiry, NewMessage, NewVisit,
    OwnedFilter, Visit, VisitStatus,
};
pub use identity::{Identity, IdentityFilter, IdentityPatch, NewIdentity};
pub use profile::{Agency, AgentProfile, AgentProfilePatch, NewAgency, NewAgentProfile, UserProfile};
pub use property::{
    ListingStatus, Location, MediaChange, NewImage, NewLocation, NewProperty, Property, PropertyFilter, PropertyImage,
    PropertyMedia, PropertyPatch, PropertyType, PropertyVideo,
};

/// Error for text columns holding an out-of-range enum value.
#[derive(Debug, thiserror::Error)]
#[error("unexpected {kind} value '{value}'")]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `FromStr`, `Display` and `TryFrom<String>` for a
/// lowercase text-backed enum.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::database::models::InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::database::models::InvalidEnumValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::database::models::InvalidEnumValue;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;
