use tracing::info;

/// User-visible NOTICE messages raised while elaborating. Each one is also
/// written to the log as it is raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices(Vec<String>);

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("NOTICE: {}", message);
        self.0.push(message);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
