//! CCG categories.
//!
//! The chart never inspects categories beyond equality, hashing and the number
//! of arguments a functor takes; the last one sizes the structural hasher's
//! contribution table (one slab per `(category, argument slot)`).
//!
//! Categories use the usual textual notation:
//!
//! ```text
//! NP                 atomic
//! S[dcl]             atomic with a feature
//! (S[dcl]\NP)/NP     transitive verb: two arguments
//! S\NP/NP            same category, slashes associate to the left
//! ```

use crate::ChartError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Direction in which a functor looks for its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slash {
    /// `X/Y`: argument to the right.
    Forward,
    /// `X\Y`: argument to the left.
    Backward,
}

impl Slash {
    fn as_char(self) -> char {
        match self {
            Slash::Forward => '/',
            Slash::Backward => '\\',
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
enum CategoryKind {
    Atomic { name: String, feature: Option<String> },
    Functor { result: Category, slash: Slash, argument: Category },
}

/// A CCG category. Cloning is cheap (shared, immutable).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Category(Arc<CategoryKind>);

impl Category {
    /// An atomic category without a feature, e.g. `NP`.
    pub fn atomic(name: impl Into<String>) -> Self {
        Category(Arc::new(CategoryKind::Atomic { name: name.into(), feature: None }))
    }

    /// An atomic category with a feature, e.g. `S[dcl]`.
    pub fn with_feature(name: impl Into<String>, feature: impl Into<String>) -> Self {
        Category(Arc::new(CategoryKind::Atomic { name: name.into(), feature: Some(feature.into()) }))
    }

    /// A functor category `result slash argument`.
    pub fn functor(result: Category, slash: Slash, argument: Category) -> Self {
        Category(Arc::new(CategoryKind::Functor { result, slash, argument }))
    }

    pub fn is_functor(&self) -> bool {
        matches!(*self.0, CategoryKind::Functor { .. })
    }

    /// The result of a functor category, `None` for atomic categories.
    pub fn result(&self) -> Option<&Category> {
        match &*self.0 {
            CategoryKind::Functor { result, .. } => Some(result),
            CategoryKind::Atomic { .. } => None,
        }
    }

    /// The argument of a functor category, `None` for atomic categories.
    pub fn argument(&self) -> Option<&Category> {
        match &*self.0 {
            CategoryKind::Functor { argument, .. } => Some(argument),
            CategoryKind::Atomic { .. } => None,
        }
    }

    pub fn slash(&self) -> Option<Slash> {
        match &*self.0 {
            CategoryKind::Functor { slash, .. } => Some(*slash),
            CategoryKind::Atomic { .. } => None,
        }
    }

    /// Number of arguments taken along the result spine.
    ///
    /// `(S\NP)/NP` takes two (slot 1 is the subject, slot 2 the object);
    /// atomic categories take none.
    pub fn number_of_arguments(&self) -> usize {
        match &*self.0 {
            CategoryKind::Atomic { .. } => 0,
            CategoryKind::Functor { result, .. } => 1 + result.number_of_arguments(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            CategoryKind::Atomic { name, feature: None } => write!(f, "{name}"),
            CategoryKind::Atomic { name, feature: Some(feature) } => write!(f, "{name}[{feature}]"),
            CategoryKind::Functor { result, slash, argument } => {
                write_operand(f, result)?;
                write!(f, "{}", slash.as_char())?;
                write_operand(f, argument)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, category: &Category) -> fmt::Result {
    if category.is_functor() { write!(f, "({category})") } else { write!(f, "{category}") }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({self})")
    }
}

impl FromStr for Category {
    type Err = ChartError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut parser = CategoryParser { text, pos: 0 };
        let category = parser.category()?;
        if parser.pos != text.len() {
            return Err(parser.error(format!("unexpected '{}' at offset {}", &text[parser.pos..], parser.pos)));
        }
        Ok(category)
    }
}

/// Parse a category list: one category per line, blank lines and `#`
/// comments ignored.
pub fn load_categories(text: &str) -> Result<Vec<Category>, ChartError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::parse)
        .collect()
}

/// Recursive-descent parser over the category notation.
///
/// ```text
/// category := primary (slash primary)*     (left associative)
/// primary  := atom | '(' category ')'
/// atom     := NAME ('[' FEATURE ']')?
/// ```
struct CategoryParser<'a> {
    text: &'a str,
    pos: usize,
}

impl CategoryParser<'_> {
    fn category(&mut self) -> Result<Category, ChartError> {
        let mut category = self.primary()?;
        while let Some(slash) = self.peek_slash() {
            self.pos += 1;
            let argument = self.primary()?;
            category = Category::functor(category, slash, argument);
        }
        Ok(category)
    }

    fn primary(&mut self) -> Result<Category, ChartError> {
        let rest = &self.text[self.pos..];
        if rest.starts_with('(') {
            self.pos += 1;
            let inner = self.category()?;
            if !self.text[self.pos..].starts_with(')') {
                return Err(self.error(format!("missing ')' at offset {}", self.pos)));
            }
            self.pos += 1;
            return Ok(inner);
        }

        let atom = regex!(r"^([A-Za-z]+|[,.;:])(?:\[([A-Za-z]+)\])?");
        let Some(caps) = atom.captures(rest) else {
            return Err(self.error(format!("expected a category at offset {}", self.pos)));
        };
        self.pos += caps[0].len();
        let name = &caps[1];
        Ok(match caps.get(2) {
            Some(feature) => Category::with_feature(name, feature.as_str()),
            None => Category::atomic(name),
        })
    }

    fn peek_slash(&self) -> Option<Slash> {
        match self.text[self.pos..].chars().next() {
            Some('/') => Some(Slash::Forward),
            Some('\\') => Some(Slash::Backward),
            _ => None,
        }
    }

    fn error(&self, reason: String) -> ChartError {
        ChartError::InvalidCategory { text: self.text.to_string(), reason }
    }
}
