use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A provider-owned message that the agent stores but never inspects.
///
/// Some backends need the exact assistant message they produced (tool call
/// ids and the like) to be echoed back on the next request. The provider
/// wraps that message in an `OpaqueMessage`, the agent appends it to the
/// conversation, and the provider unwraps it again with
/// [`OpaqueMessage::to_raw`] when building the next payload.
///
/// Two opaque messages are equal when their ids are equal.
#[derive(Clone)]
pub struct OpaqueMessage {
    id: Arc<str>,
    value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueMessage {
    /// Wraps `value` under an id that is unique within the conversation.
    #[inline]
    pub fn new<ID: Into<String>, T: Send + Sync + 'static>(
        id: ID,
        value: T,
    ) -> Self {
        Self {
            id: id.into().into(),
            value: Arc::new(value),
        }
    }

    /// Returns the id this message was created with.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Borrows the wrapped value if it has type `T`.
    ///
    /// Returns `None` for messages wrapped by another provider.
    #[inline]
    pub fn to_raw<T: 'static>(&self) -> Option<&T> {
        (*self.value).downcast_ref()
    }
}

impl Debug for OpaqueMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueMessage").field(&self.id).finish()
    }
}

impl PartialEq for OpaqueMessage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueMessage {}

impl Hash for OpaqueMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
