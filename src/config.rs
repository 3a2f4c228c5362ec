//! Parser configuration.

/// Normalization applied to tag and attribute names in lenient mode.
///
/// Strict mode never transforms names, whatever this is set to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CaseTransform {
    /// Keep names exactly as written.
    #[default]
    Preserve,
    /// Lowercase names at the moment they are committed.
    Lowercase,
    /// Uppercase names at the moment they are committed.
    Uppercase,
}

/// User-defined settings that affect parsing.
///
/// The [`Default`] value is the lenient, HTML-ish preset. Use
/// [`Config::strict()`] for strict XML fidelity.
#[derive(Clone, Debug)]
pub struct Config {
    /// Reject constructs that lenient parsing accepts, keep name case, and
    /// latch syntax diagnostics so the next [`Parser::write`] fails.
    ///
    /// Default: `false`.
    ///
    /// [`Parser::write`]: crate::Parser::write
    pub strict: bool,
    /// Normalize tag and attribute names when not strict.
    ///
    /// Default: [`CaseTransform::Preserve`].
    pub case_transform: CaseTransform,
    /// Strip leading and trailing ASCII whitespace from text and comment
    /// events. Applied before [`Self::normalize`]. CDATA is never touched.
    ///
    /// Default: `false`.
    pub trim: bool,
    /// Collapse runs of ASCII whitespace in text and comment events into a
    /// single space. CDATA is never touched.
    ///
    /// Default: `false`.
    pub normalize: bool,
    /// Resolve `xmlns` declarations and defer attribute events until the
    /// bindings of the element are known.
    ///
    /// Default: `false`.
    pub namespaces: bool,
    /// Maintain line/column/offset so error payloads carry a [`Position`].
    ///
    /// Default: `true`.
    ///
    /// [`Position`]: crate::Position
    pub track_position: bool,
    /// Resolve only the five XML predefined entities, ignoring the extended
    /// named set and the process-wide registry.
    ///
    /// Default: `false`.
    pub strict_entities: bool,
    /// Tolerate attribute values without quotes. `None` resolves to
    /// `!strict`.
    ///
    /// Default: `None`.
    pub unquoted_attribute_values: Option<bool>,
    /// Re-feed the replacement text of non-predefined entities through the
    /// machine, so replacements may contain markup.
    ///
    /// Default: `false`.
    pub unparsed_entities: bool,
    /// Treat the content of `<script>` elements as raw text up to the next
    /// `</script`. Only honored when not strict.
    ///
    /// Default: `false`.
    pub allow_script: bool,
    /// Size in bytes any single internal buffer may reach before the
    /// overflow sweep fires. `usize::MAX` disables the sweep.
    ///
    /// Default: 64 KiB.
    pub max_buffer_length: usize,
}

/// Default size in bytes any single internal buffer may reach.
pub(crate) const MAX_BUFFER_LENGTH: usize = 64 * 1024;

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            case_transform: CaseTransform::Preserve,
            trim: false,
            normalize: false,
            namespaces: false,
            track_position: true,
            strict_entities: false,
            unquoted_attribute_values: None,
            unparsed_entities: false,
            allow_script: false,
            max_buffer_length: MAX_BUFFER_LENGTH,
        }
    }
}

impl Config {
    /// The strict XML preset: `strict: true`, everything else as
    /// [`Default`].
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Whether unquoted attribute values are tolerated, with the `None`
    /// default resolved against [`Self::strict`].
    pub(crate) fn unquoted_values(&self) -> bool {
        self.unquoted_attribute_values.unwrap_or(!self.strict)
    }
}
