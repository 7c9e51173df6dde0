use std::fmt;

/// Where and how to connect to vCenter.
#[derive(Clone, PartialEq, Eq)]
pub struct VsConnection {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,

    /// Skips verification of the server's TLS certificate
    pub insecure: bool,
}

impl VsConnection {
    pub fn url(&self) -> String {
        format!("https://{}:{}/sdk", self.host, self.port)
    }
}

impl fmt::Debug for VsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VsConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("insecure", &self.insecure)
            .finish()
    }
}
