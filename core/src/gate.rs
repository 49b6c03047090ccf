/// Decides whether mutating store operations may run right now.
pub trait AccessGate {
    fn mutations_permitted(&self) -> bool;
}

/// Gate used when no login is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl AccessGate for OpenGate {
    fn mutations_permitted(&self) -> bool { true }
}

impl AccessGate for bool {
    fn mutations_permitted(&self) -> bool { *self }
}
