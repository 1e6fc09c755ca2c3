//! IDE feature categories a mapping participates in.

bitflags::bitflags! {
    /// A set of IDE feature capabilities.
    ///
    /// Fixed at mapping construction. A query that requires a capability
    /// skips every mapping whose set does not contain it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        /// Hover information.
        const HOVER = 1 << 0;
        /// Find references and go to definition.
        const REFERENCES = 1 << 1;
        /// Rename.
        const RENAME = 1 << 2;
        /// Diagnostics reported by the checking engine.
        const DIAGNOSTICS = 1 << 3;
        /// Formatting edits.
        const FORMAT = 1 << 4;
        /// Completion.
        const COMPLETION = 1 << 5;
        /// Semantic tokens.
        const SEMANTIC_TOKENS = 1 << 6;
        /// Folding ranges.
        const FOLDING = 1 << 7;
    }
}

impl Capabilities {
    /// Hover and references.
    pub const NAVIGATION: Self = Self::HOVER.union(Self::REFERENCES);

    /// Everything a copied script expression takes part in.
    pub const CODE: Self = Self::HOVER
        .union(Self::REFERENCES)
        .union(Self::RENAME)
        .union(Self::DIAGNOSTICS)
        .union(Self::COMPLETION)
        .union(Self::SEMANTIC_TOKENS);

    /// Every capability: text copied verbatim from the source.
    pub const VERBATIM: Self = Self::all();

    /// A bare name (attribute, prop, tag): navigable and renameable but
    /// neither formatted nor folded.
    pub const NAME: Self = Self::HOVER
        .union(Self::REFERENCES)
        .union(Self::RENAME)
        .union(Self::COMPLETION)
        .union(Self::DIAGNOSTICS)
        .union(Self::SEMANTIC_TOKENS);

    /// Only existence diagnostics.
    pub const DIAGNOSTIC_ONLY: Self = Self::DIAGNOSTICS;

    /// Style text: no rename, no diagnostics from the script engine.
    pub const STYLE: Self = Self::HOVER
        .union(Self::REFERENCES)
        .union(Self::FORMAT)
        .union(Self::COMPLETION)
        .union(Self::SEMANTIC_TOKENS)
        .union(Self::FOLDING)
        .union(Self::DIAGNOSTICS);

    /// Markup text handed to the markup checker.
    pub const MARKUP: Self = Self::HOVER
        .union(Self::FORMAT)
        .union(Self::COMPLETION)
        .union(Self::FOLDING);

    /// Whether every capability in `required` is present.
    ///
    /// An empty requirement always passes.
    #[inline]
    pub fn allows(self, required: Capabilities) -> bool {
        self.contains(required)
    }
}
