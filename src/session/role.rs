use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two participant slots of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Host, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Guest => "guest",
        }
    }

    pub fn peer(&self) -> Role {
        match self {
            Role::Host => Role::Guest,
            Role::Guest => Role::Host,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held once per role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerRole<T> {
    pub host: T,
    pub guest: T,
}

impl<T> PerRole<T> {
    pub fn new(host: T, guest: T) -> Self {
        Self { host, guest }
    }

    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::Host => &self.host,
            Role::Guest => &self.guest,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::Host => &mut self.host,
            Role::Guest => &mut self.guest,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        [(Role::Host, &self.host), (Role::Guest, &self.guest)].into_iter()
    }
}
