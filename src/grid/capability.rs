/// A rendering primitive that becomes available asynchronously.
///
/// Hosts start in [`Capability::NotReady`] and switch to
/// [`Capability::Ready`] once the primitive has loaded; the grid renders a
/// size-matched placeholder until then.
#[derive(Debug, Clone, Default)]
pub enum Capability<T> {
    #[default]
    NotReady,
    Ready(T),
}

impl<T> Capability<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Capability::Ready(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Capability::Ready(value) => Some(value),
            Capability::NotReady => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Capability::Ready(value) => Some(value),
            Capability::NotReady => None,
        }
    }

    /// Mark the capability as loaded
    pub fn resolve(&mut self, value: T) {
        *self = Capability::Ready(value);
    }
}
