//! The type registry: which in-memory kinds get tagged, and how.
//!
//! A registry is an ordered list of [`KindCodec`]s. Encoding scans the list
//! and the first codec whose predicate matches wins. Decoding looks a codec
//! up by the discriminator found under [`TYPE_KEY`].

use crate::decode::DecodeContext;
use crate::encode::EncodeContext;
use crate::error::{ConvertError, Result};
use crate::kinds;
use crate::options::DEFAULT_MAX_DEPTH;
use extjson_types::ExtValue;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Reserved key marking a JSON object as a tagged encoding.
///
/// Part of the on-disk format; never change it.
pub const TYPE_KEY: &str = "__type__";

/// Key holding the payload of a leaf kind's envelope.
pub const VALUE_KEY: &str = "value";

/// Encoding and decoding rules for one extended kind.
pub trait KindCodec: Send + Sync {
    /// Identifier of the kind. Also the discriminator this codec decodes.
    fn kind(&self) -> &str;

    /// Returns true if this codec is responsible for `value`.
    fn matches(&self, value: &ExtValue) -> bool;

    /// Produces the JSON form of `value`. Nested values go back through
    /// `cx` so depth, cycle and path tracking stay intact.
    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value>;

    /// Rebuilds a value from a tagged object.
    ///
    /// The default has no decode rule and keeps the object as a plain
    /// mapping, discriminator included.
    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        cx.decode_object(tagged)
    }
}

type Predicate = dyn Fn(&ExtValue) -> bool + Send + Sync;
type EncodeFn = dyn Fn(&ExtValue) -> std::result::Result<Value, String> + Send + Sync;
type DecodeFn = dyn Fn(&Value) -> std::result::Result<ExtValue, String> + Send + Sync;

/// A leaf kind described by closures. See [`TypeRegistry::register_fn`].
struct FnCodec {
    kind: String,
    predicate: Box<Predicate>,
    encode: Box<EncodeFn>,
    decode: Box<DecodeFn>,
}

impl KindCodec for FnCodec {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn matches(&self, value: &ExtValue) -> bool {
        (self.predicate)(value)
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        let payload = (self.encode)(value).map_err(|message| cx.invalid_value(&self.kind, message))?;
        Ok(kinds::envelope(&self.kind, payload))
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        let payload = kinds::payload(&self.kind, tagged, cx)?;
        (self.decode)(payload).map_err(|message| cx.invalid_value(&self.kind, message))
    }
}

/// Ordered collection of kind codecs.
///
/// `Default` is [`TypeRegistry::builtin`].
#[derive(Clone)]
pub struct TypeRegistry {
    codecs: Vec<Arc<dyn KindCodec>>,
}

impl TypeRegistry {
    /// A registry with no kinds. Only plain JSON values can be encoded.
    #[must_use]
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// The built-in kinds, in scan order: `datetime`, `date`, `time`,
    /// `duration`, `uuid`, `decimal`, `set`, `self_serializing`, `record`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    /// Appends the built-in kinds after any already registered.
    ///
    /// Kinds registered before this call are scanned first, so they can
    /// claim values a built-in kind would otherwise encode.
    pub fn register_builtins(&mut self) -> &mut Self {
        self.register(kinds::DateTimeKind)
            .register(kinds::DateKind)
            .register(kinds::TimeKind)
            .register(kinds::DurationKind)
            .register(kinds::UuidKind)
            .register(kinds::DecimalKind)
            .register(kinds::SetKind)
            .register(kinds::SelfSerializingKind)
            .register(kinds::RecordKind::any())
    }

    /// Adds a codec, or replaces the one already registered for its kind.
    ///
    /// A replacement keeps the scan position of the entry it replaces.
    pub fn register<C: KindCodec + 'static>(&mut self, codec: C) -> &mut Self {
        self.register_arc(Arc::new(codec))
    }

    /// Like [`register`](Self::register) for an already shared codec.
    pub fn register_arc(&mut self, codec: Arc<dyn KindCodec>) -> &mut Self {
        match self.codecs.iter().position(|c| c.kind() == codec.kind()) {
            Some(index) => {
                debug!("Replacing codec for kind {}", codec.kind());
                self.codecs[index] = codec;
            }
            None => {
                debug!("Registering codec for kind {}", codec.kind());
                self.codecs.push(codec);
            }
        }
        self
    }

    /// Registers a leaf kind from closures.
    ///
    /// `encode` maps a value to its payload and `decode` maps the payload
    /// back. The registry wraps the payload as
    /// `{"__type__": kind, "value": payload}`. Error strings become
    /// [`ConvertError::InvalidTaggedValue`].
    pub fn register_fn<P, E, D>(
        &mut self,
        kind: impl Into<String>,
        predicate: P,
        encode: E,
        decode: D,
    ) -> &mut Self
    where
        P: Fn(&ExtValue) -> bool + Send + Sync + 'static,
        E: Fn(&ExtValue) -> std::result::Result<Value, String> + Send + Sync + 'static,
        D: Fn(&Value) -> std::result::Result<ExtValue, String> + Send + Sync + 'static,
    {
        self.register(FnCodec {
            kind: kind.into(),
            predicate: Box::new(predicate),
            encode: Box::new(encode),
            decode: Box::new(decode),
        })
    }

    /// Registers a decode rule for records of kind `name`, so they come
    /// back as [`ExtValue::Record`] instead of a plain mapping. Registering
    /// `record` itself makes the catch-all record codec decode as well.
    pub fn register_record(&mut self, name: impl Into<String>) -> &mut Self {
        self.register(kinds::RecordKind::named(name))
    }

    /// The codec registered under `kind`.
    #[must_use]
    pub fn lookup(&self, kind: &str) -> Option<&dyn KindCodec> {
        self.codecs
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| &**c)
    }

    /// The first codec, in scan order, that claims `value`.
    #[must_use]
    pub fn find_codec(&self, value: &ExtValue) -> Option<&dyn KindCodec> {
        self.codecs
            .iter()
            .find(|c| c.matches(value))
            .map(|c| &**c)
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.lookup(kind).is_some()
    }

    /// Registered kind ids in scan order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.codecs.iter().map(|c| c.kind())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Encodes a single value.
    ///
    /// Primitive JSON values pass through untagged. Containers are walked,
    /// so this is the same traversal `Converter` uses, without rendering.
    pub fn encode_value(&self, value: &ExtValue) -> Result<Value> {
        EncodeContext::new(self, DEFAULT_MAX_DEPTH).encode(value)
    }

    /// Decodes a single tagged object.
    ///
    /// An unrecognized discriminator fails with `UnknownType` when `strict`
    /// is set and is kept as a plain mapping otherwise.
    pub fn decode_value(&self, tagged: &Map<String, Value>, strict: bool) -> Result<ExtValue> {
        DecodeContext::new(self, strict, DEFAULT_MAX_DEPTH).decode_map(tagged)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("kinds", &self.kinds().collect::<Vec<_>>())
            .finish()
    }
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// The process-wide registry.
///
/// Initialized with [`TypeRegistry::builtin`] on first use unless
/// [`install_global_registry`] ran earlier.
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL.get_or_init(TypeRegistry::builtin)
}

/// Installs `registry` as the process-wide registry.
///
/// Must run before anything reads the global registry; afterwards it is
/// read-only and a second install fails with `RegistryAlreadyInstalled`.
pub fn install_global_registry(registry: TypeRegistry) -> Result<()> {
    let kinds = registry.len();
    GLOBAL
        .set(registry)
        .map_err(|_| ConvertError::RegistryAlreadyInstalled)?;
    debug!("Installed global type registry with {kinds} kinds");
    Ok(())
}
