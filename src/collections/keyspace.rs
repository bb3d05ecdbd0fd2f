//! Key lifecycle shared by every handle

use crate::client::Client;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::{extract_integer, extract_string, RespFrame};

/// A client plus the key a handle is bound to
#[derive(Debug, Clone)]
pub struct Binding {
    client: Client,
    key: String,
}

impl Binding {
    pub(crate) fn new(client: &Client, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        client.validate_key(&key)?;
        Ok(Binding {
            client: client.clone(),
            key,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn execute(&self, command: Command) -> Result<RespFrame> {
        self.client.execute(command)
    }

    fn rebind(&mut self, key: String) {
        self.key = key;
    }
}

/// Operations on the key behind a handle, whatever it holds
pub trait Keyspace {
    fn binding(&self) -> &Binding;

    fn binding_mut(&mut self) -> &mut Binding;

    fn key(&self) -> &str {
        self.binding().key()
    }

    fn exists(&self) -> Result<bool> {
        let reply = self.binding().execute(Command::Exists { key: self.key().to_string() })?;
        Ok(extract_integer(&reply)? > 0)
    }

    /// Type name reported by the store (`"none"` when absent)
    fn redis_type(&self) -> Result<String> {
        extract_string(&self.binding().execute(Command::Type { key: self.key().to_string() })?)
    }

    /// Rename the key, overwriting `new_key`. The handle follows.
    fn rename(&mut self, new_key: &str) -> Result<()> {
        self.binding().client().validate_key(new_key)?;
        let command = Command::Rename {
            key: self.key().to_string(),
            new_key: new_key.to_string(),
        };
        self.binding().execute(command).map_err(|err| missing_key(err, self.key()))?;
        self.binding_mut().rebind(new_key.to_string());
        Ok(())
    }

    /// Rename only if `new_key` is free. Returns whether the rename happened.
    fn rename_nx(&mut self, new_key: &str) -> Result<bool> {
        self.binding().client().validate_key(new_key)?;
        let command = Command::RenameNx {
            key: self.key().to_string(),
            new_key: new_key.to_string(),
        };
        let reply = self.binding().execute(command).map_err(|err| missing_key(err, self.key()))?;
        let renamed = extract_integer(&reply)? == 1;
        if renamed {
            self.binding_mut().rebind(new_key.to_string());
        }
        Ok(renamed)
    }

    /// Seconds left to live; `None` when the key is persistent or absent
    fn expiration(&self) -> Result<Option<u64>> {
        let ttl = extract_integer(&self.binding().execute(Command::Ttl { key: self.key().to_string() })?)?;
        Ok(u64::try_from(ttl).ok())
    }

    fn expire(&self, seconds: u64) -> Result<bool> {
        let command = Command::Expire {
            key: self.key().to_string(),
            seconds,
        };
        Ok(extract_integer(&self.binding().execute(command)?)? == 1)
    }

    /// Expire at a unix timestamp (seconds)
    fn expire_at(&self, timestamp: u64) -> Result<bool> {
        let command = Command::ExpireAt {
            key: self.key().to_string(),
            timestamp,
        };
        Ok(extract_integer(&self.binding().execute(command)?)? == 1)
    }

    /// Move the key to another database of the same store
    fn move_to(&self, db: usize) -> Result<bool> {
        let command = Command::Move {
            key: self.key().to_string(),
            db,
        };
        Ok(extract_integer(&self.binding().execute(command)?)? == 1)
    }

    fn delete(&self) -> Result<bool> {
        let reply = self.binding().execute(Command::Del { keys: vec![self.key().to_string()] })?;
        Ok(extract_integer(&reply)? > 0)
    }
}

fn missing_key(err: Error, key: &str) -> Error {
    match err {
        Error::Store(message) if message.contains("no such key") => {
            Error::Key(format!("key '{}' does not exist", key))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::Set;

    #[test]
    fn test_rename_follows_key() {
        let client = Client::memory();
        let mut set = Set::with_members(&client, "before", ["a".to_string()]).unwrap();

        set.rename("after").unwrap();
        assert_eq!(set.key(), "after");
        assert!(set.exists().unwrap());
        assert!(!client.set::<String>("before").unwrap().exists().unwrap());
        assert_eq!(set.redis_type().unwrap(), "set");
    }

    #[test]
    fn test_rename_missing_key() {
        let client = Client::memory();
        let mut set: Set<String> = client.set("nothing").unwrap();
        assert!(matches!(set.rename("other"), Err(Error::Key(_))));
        assert_eq!(set.key(), "nothing");
        assert!(matches!(set.rename(""), Err(Error::Type(_))));
    }

    #[test]
    fn test_rename_nx() {
        let client = Client::memory();
        let mut a = Set::with_members(&client, "a", [1i64]).unwrap();
        let _b = Set::with_members(&client, "b", [2i64]).unwrap();

        assert!(!a.rename_nx("b").unwrap());
        assert_eq!(a.key(), "a");
        assert!(a.rename_nx("c").unwrap());
        assert_eq!(a.key(), "c");
    }

    #[test]
    fn test_expiration() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", [true]).unwrap();
        assert_eq!(set.expiration().unwrap(), None);
        assert!(set.expire(100).unwrap());
        let ttl = set.expiration().unwrap().unwrap();
        assert!(ttl > 90 && ttl <= 100);

        assert!(set.expire_at(1).unwrap());
        assert!(!set.exists().unwrap());
        assert_eq!(set.expiration().unwrap(), None);
    }

    #[test]
    fn test_move_and_delete() {
        let client = Client::memory();
        let set = Set::with_members(&client, "s", [1i64]).unwrap();
        assert!(set.move_to(3).unwrap());
        assert!(!set.exists().unwrap());
        assert!(!set.delete().unwrap());
        assert_eq!(set.redis_type().unwrap(), "none");
    }
}
