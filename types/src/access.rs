//! Single-admin access control and the pause switch.
//!
//! Each component embeds one [`AccessControl`] and one [`PauseSwitch`]. The
//! host flips every switch together to realise the global halt.

use crate::address::Address;
use crate::error::AccessError;
use serde::{Deserialize, Serialize};

/// The administrative identity allowed to configure a component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    admin: Address,
}

impl AccessControl {
    pub fn new(admin: Address) -> Result<Self, AccessError> {
        if admin.is_zero() {
            return Err(AccessError::NullAdmin);
        }
        Ok(Self { admin })
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn is_admin(&self, caller: &Address) -> bool {
        self.admin == *caller
    }

    pub fn ensure_admin(&self, caller: &Address) -> Result<(), AccessError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(AccessError::NotAdmin(*caller))
        }
    }

    /// Allow `caller` if it is `owner` or the admin.
    pub fn ensure_owner_or_admin(&self, caller: &Address, owner: &Address) -> Result<(), AccessError> {
        if caller == owner || self.is_admin(caller) {
            Ok(())
        } else {
            Err(AccessError::NotOwnerOrAdmin {
                caller: *caller,
                owner: *owner,
            })
        }
    }

    /// Hand the admin role to `new_admin`. Only the current admin may do this.
    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), AccessError> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(AccessError::NullAdmin);
        }
        self.admin = new_admin;
        Ok(())
    }
}

/// Halts every mutating entry point of a component while set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ensure_not_paused(&self) -> Result<(), AccessError> {
        if self.paused {
            Err(AccessError::Paused)
        } else {
            Ok(())
        }
    }

    pub fn pause(&mut self) -> Result<(), AccessError> {
        self.ensure_not_paused()?;
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<(), AccessError> {
        if !self.paused {
            return Err(AccessError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }
}
