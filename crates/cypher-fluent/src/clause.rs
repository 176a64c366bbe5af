//! Clause fragments and the immutable clause accumulator.

use crate::param::ParamTable;
use serde_json::Value;

/// The clause kinds the builder can emit, declared in rendering precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKind {
    Start,
    Match,
    Where,
    Create,
    Set,
    Delete,
    With,
    Return,
    OrderBy,
    Skip,
    Limit,
}

impl ClauseKind {
    /// All kinds in the order they are rendered.
    pub const PRECEDENCE: [ClauseKind; 11] = [
        ClauseKind::Start,
        ClauseKind::Match,
        ClauseKind::Where,
        ClauseKind::Create,
        ClauseKind::Set,
        ClauseKind::Delete,
        ClauseKind::With,
        ClauseKind::Return,
        ClauseKind::OrderBy,
        ClauseKind::Skip,
        ClauseKind::Limit,
    ];

    /// The clause keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            ClauseKind::Start => "START",
            ClauseKind::Match => "MATCH",
            ClauseKind::Where => "WHERE",
            ClauseKind::Create => "CREATE",
            ClauseKind::Set => "SET",
            ClauseKind::Delete => "DELETE",
            ClauseKind::With => "WITH",
            ClauseKind::Return => "RETURN",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::Skip => "SKIP",
            ClauseKind::Limit => "LIMIT",
        }
    }

    /// Separator placed between bits of the same kind.
    pub fn bit_separator(self) -> &'static str {
        match self {
            ClauseKind::Where => " AND ",
            _ => ", ",
        }
    }

    /// Whether several fragments of this kind accumulate.
    ///
    /// Single-valued kinds keep only their latest fragment.
    pub fn is_repeatable(self) -> bool {
        !matches!(
            self,
            ClauseKind::Return | ClauseKind::Skip | ClauseKind::Limit
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Part {
    Raw(String),
    Param(String),
}

/// One clause fragment: literal text interleaved with parameter references.
#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    kind: ClauseKind,
    parts: Vec<Part>,
}

impl Clause {
    /// The kind of this fragment.
    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    /// Names of the parameters referenced by this fragment, in text order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Param(name) => Some(name.as_str()),
            Part::Raw(_) => None,
        })
    }

    pub(crate) fn parts(&self) -> &[Part] {
        &self.parts
    }
}

/// Writes the text of a single fragment, binding literals into the parameter table as it goes.
pub struct ClauseWriter<'a> {
    parts: Vec<Part>,
    params: &'a mut ParamTable,
}

impl<'a> ClauseWriter<'a> {
    fn new(params: &'a mut ParamTable) -> Self {
        Self {
            parts: Vec::new(),
            params,
        }
    }

    /// Append literal text (no parameters).
    pub fn push(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(Part::Raw(last)) => last.push_str(text),
            _ => self.parts.push(Part::Raw(text.to_string())),
        }
        self
    }

    /// Bind a value and append a reference to it.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        let name = self.params.bind(value);
        self.parts.push(Part::Param(name));
        self
    }

    /// Bind every value and append the references separated by `, `.
    pub fn push_bind_list<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_bind(value);
        }
        self
    }

    /// Append a template, binding one value for each `?`.
    ///
    /// A `?` inside a `'...'` or `"..."` string literal is text, not a marker; backslash escapes
    /// the next character inside a literal. Surplus `?` characters (more markers than values)
    /// are kept as literal text; surplus values are ignored.
    pub fn push_template<V: Into<Value>>(
        &mut self,
        template: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let mut values = values.into_iter();
        let mut literal = String::new();
        let mut quote: Option<char> = None;
        let mut escaped = false;
        for ch in template.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                literal.push(ch);
                continue;
            }
            if ch == '\'' || ch == '"' {
                quote = Some(ch);
            } else if ch == '?' {
                if let Some(value) = values.next() {
                    self.push(&literal);
                    literal.clear();
                    self.push_bind(value);
                    continue;
                }
            }
            literal.push(ch);
        }
        self.push(&literal);
        self
    }

    fn finish(self, kind: ClauseKind) -> Clause {
        Clause {
            kind,
            parts: self.parts,
        }
    }
}

/// An ordered sequence of clause fragments.
///
/// Appending never touches the receiver; it returns a new accumulator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clauses {
    fragments: Vec<Clause>,
}

impl Clauses {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new accumulator with one more fragment of `kind`.
    ///
    /// `build` writes the fragment text and binds its literals into `params`. For single-valued
    /// kinds the previous fragment of that kind is dropped.
    pub fn with_clause<F>(&self, params: &mut ParamTable, kind: ClauseKind, build: F) -> Self
    where
        F: FnOnce(&mut ClauseWriter<'_>),
    {
        let mut writer = ClauseWriter::new(params);
        build(&mut writer);
        let clause = writer.finish(kind);

        let mut fragments = self.fragments.clone();
        if !kind.is_repeatable() {
            fragments.retain(|c| c.kind != kind);
        }
        fragments.push(clause);
        Self { fragments }
    }

    /// Fragments in call order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.fragments.iter()
    }

    /// Fragments of one kind, in call order.
    pub fn of_kind(&self, kind: ClauseKind) -> impl Iterator<Item = &Clause> {
        self.fragments.iter().filter(move |c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
