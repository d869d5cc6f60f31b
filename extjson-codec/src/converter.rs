//! The converter handle.

use crate::registry::{TypeRegistry, global_registry};

/// Encodes and decodes extended values against one [`TypeRegistry`].
///
/// A converter only borrows its registry and keeps no state between calls,
/// so it is cheap to create and safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Converter<'r> {
    /// Creates a converter over `registry`.
    #[must_use]
    pub const fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// The registry this converter consults.
    #[must_use]
    pub const fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }
}

impl Converter<'static> {
    /// A converter over the process-wide registry.
    #[must_use]
    pub fn global() -> Self {
        Self::new(global_registry())
    }
}

impl Default for Converter<'static> {
    fn default() -> Self {
        Self::global()
    }
}
