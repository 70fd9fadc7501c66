use gma3osc_frame::{AddressBuilder, NAME_LENGTH_MAX};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};

/// Longest label accepted: a label plus its NUL terminator must fit a
/// [`NAME_LENGTH_MAX`]-byte buffer.
pub const MAX_LABEL_LEN: usize = NAME_LENGTH_MAX - 1;

/// Address labels used when building device addresses.
///
/// An empty `prefix`, `pool` or `page` label removes that level from every
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Naming {
    pub prefix: String,
    pub pool: String,
    pub page: String,
    pub fader: String,
    pub encoder: String,
    pub key: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            prefix: "gma3".to_string(),
            pool: "DataPool".to_string(),
            page: "Page".to_string(),
            fader: "Fader".to_string(),
            encoder: "Encoder".to_string(),
            key: "Key".to_string(),
        }
    }
}

impl Naming {
    /// Check every label against [`MAX_LABEL_LEN`].
    pub fn validate(&self) -> Result<()> {
        for label in [
            &self.prefix,
            &self.pool,
            &self.page,
            &self.fader,
            &self.encoder,
            &self.key,
        ] {
            check_label(label)?;
        }
        Ok(())
    }
}

/// Kind of addressable executor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Fader,
    Encoder,
    Key,
}

/// Per-device pool/page override. `0` means "use the registry's common value".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub pool: u16,
    pub page: u16,
}

/// Naming and shared pool/page context for one control surface.
///
/// Owned by the [`Surface`](crate::Surface) and passed to every device on
/// update, so independent surfaces never share state.
#[derive(Debug, Clone)]
pub struct Registry {
    naming: Naming,
    prefix_search: String,
    common_pool: u16,
    common_page: u16,
}

impl Registry {
    /// Default grandMA3 naming, pool 1, page 1.
    pub fn new() -> Self {
        let naming = Naming::default();
        Self {
            prefix_search: search_string(&naming.prefix),
            naming,
            common_pool: 1,
            common_page: 1,
        }
    }

    pub fn from_naming(naming: Naming) -> Result<Self> {
        naming.validate()?;
        Ok(Self {
            prefix_search: search_string(&naming.prefix),
            naming,
            common_pool: 1,
            common_page: 1,
        })
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    pub fn prefix(&self) -> &str {
        &self.naming.prefix
    }

    /// Inbound filter derived from the prefix (`/gma3/`), or empty.
    pub fn prefix_search(&self) -> &str {
        &self.prefix_search
    }

    pub fn set_prefix(&mut self, prefix: &str) -> Result<()> {
        check_label(prefix)?;
        self.naming.prefix = prefix.to_string();
        self.prefix_search = search_string(prefix);
        Ok(())
    }

    pub fn set_pool_label(&mut self, label: &str) -> Result<()> {
        check_label(label)?;
        self.naming.pool = label.to_string();
        Ok(())
    }

    pub fn set_page_label(&mut self, label: &str) -> Result<()> {
        check_label(label)?;
        self.naming.page = label.to_string();
        Ok(())
    }

    pub fn set_fader_label(&mut self, label: &str) -> Result<()> {
        check_label(label)?;
        self.naming.fader = label.to_string();
        Ok(())
    }

    pub fn set_encoder_label(&mut self, label: &str) -> Result<()> {
        check_label(label)?;
        self.naming.encoder = label.to_string();
        Ok(())
    }

    pub fn set_key_label(&mut self, label: &str) -> Result<()> {
        check_label(label)?;
        self.naming.key = label.to_string();
        Ok(())
    }

    /// Pool used by devices without a local override.
    pub fn common_pool(&self) -> u16 {
        self.common_pool
    }

    pub fn set_common_pool(&mut self, pool: u16) {
        self.common_pool = pool;
    }

    /// Page used by devices without a local override.
    pub fn common_page(&self) -> u16 {
        self.common_page
    }

    pub fn set_common_page(&mut self, page: u16) {
        self.common_page = page;
    }

    pub fn label(&self, entity: Entity) -> &str {
        match entity {
            Entity::Fader => &self.naming.fader,
            Entity::Encoder => &self.naming.encoder,
            Entity::Key => &self.naming.key,
        }
    }

    /// Build `/<prefix>/<pool><n>/<page><n>/<entity><number>`.
    ///
    /// Non-zero overrides replace the common pool/page numbers.
    pub fn entity_address(
        &self,
        entity: Entity,
        number: u16,
        overrides: Overrides,
    ) -> gma3osc_frame::Result<String> {
        let pool = pick(overrides.pool, self.common_pool);
        let page = pick(overrides.page, self.common_page);

        let mut address = AddressBuilder::new();
        address.segment(&self.naming.prefix)?;
        address.level(&self.naming.pool, u32::from(pool))?;
        address.level(&self.naming.page, u32::from(page))?;
        address.numbered(self.label(entity), u32::from(number))?;
        Ok(address.finish())
    }

    /// Command line address: `/<prefix>/cmd`, or `/cmd` without a prefix.
    pub fn command_address(&self) -> gma3osc_frame::Result<String> {
        let mut address = AddressBuilder::new();
        address.segment(&self.naming.prefix)?;
        address.segment("cmd")?;
        Ok(address.finish())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn pick(local: u16, common: u16) -> u16 {
    if local > 0 {
        local
    } else {
        common
    }
}

fn search_string(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format!("/{prefix}/")
    }
}

fn check_label(label: &str) -> Result<()> {
    if label.len() + 1 > NAME_LENGTH_MAX {
        return Err(SurfaceError::NameTooLong {
            label: label.to_string(),
            len: label.len(),
            max: MAX_LABEL_LEN,
        });
    }
    if label.contains(['/', '\0']) {
        return Err(SurfaceError::Config(format!(
            "label {label:?} must not contain '/' or NUL"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming_builds_console_addresses() {
        let registry = Registry::new();
        assert_eq!(registry.prefix_search(), "/gma3/");
        assert_eq!(
            registry
                .entity_address(Entity::Key, 7, Overrides::default())
                .unwrap(),
            "/gma3/DataPool1/Page1/Key7"
        );
        assert_eq!(registry.command_address().unwrap(), "/gma3/cmd");
    }

    #[test]
    fn overrides_take_precedence_over_common_values() {
        let mut registry = Registry::new();
        registry.set_common_pool(3);
        registry.set_common_page(4);
        let address = registry
            .entity_address(Entity::Fader, 201, Overrides { pool: 0, page: 9 })
            .unwrap();
        assert_eq!(address, "/gma3/DataPool3/Page9/Fader201");
    }

    #[test]
    fn empty_labels_remove_levels() {
        let mut registry = Registry::new();
        registry.set_prefix("").unwrap();
        registry.set_pool_label("").unwrap();
        registry.set_encoder_label("Knob").unwrap();
        assert_eq!(registry.prefix_search(), "");
        assert_eq!(
            registry
                .entity_address(Entity::Encoder, 301, Overrides::default())
                .unwrap(),
            "/Page1/Knob301"
        );
        assert_eq!(registry.command_address().unwrap(), "/cmd");
    }

    #[test]
    fn overlong_label_is_rejected() {
        let mut registry = Registry::new();
        let err = registry.set_key_label(&"k".repeat(NAME_LENGTH_MAX)).unwrap_err();
        assert!(matches!(err, SurfaceError::NameTooLong { len: 32, max: 31, .. }));
        assert_eq!(registry.label(Entity::Key), "Key");
    }

    #[test]
    fn label_filling_buffer_with_terminator_is_accepted() {
        let mut registry = Registry::new();
        let label = "k".repeat(NAME_LENGTH_MAX - 1);
        registry.set_key_label(&label).unwrap();
        assert_eq!(registry.label(Entity::Key), label);
    }

    #[test]
    fn label_with_separator_is_rejected() {
        let naming = Naming {
            page: "Pa/ge".to_string(),
            ..Naming::default()
        };
        assert!(matches!(
            Registry::from_naming(naming),
            Err(SurfaceError::Config(_))
        ));
    }

    #[test]
    fn longest_labels_cannot_overflow_the_address() {
        let label = "L".repeat(MAX_LABEL_LEN);
        let naming = Naming {
            prefix: label.clone(),
            pool: label.clone(),
            page: label.clone(),
            fader: label.clone(),
            encoder: label.clone(),
            key: label,
        };
        let registry = Registry::from_naming(naming).unwrap();
        let err = registry
            .entity_address(Entity::Key, 1, Overrides::default())
            .unwrap_err();
        assert!(matches!(
            err,
            gma3osc_frame::FrameError::AddressTooLong { .. }
        ));
    }
}
