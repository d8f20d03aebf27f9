//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw value of `key` in `[section]`, if present.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn has_section(&self, section: &str) -> bool;
}
