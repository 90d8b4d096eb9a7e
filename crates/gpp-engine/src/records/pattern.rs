use regex::Regex;

/// A list of category expressions matched against the whole field value.
///
/// `Major-.*` matches `Major-Core` but `Major` does not match `Major-Core`;
/// substring hits never count. An empty set matches nothing.
#[derive(Debug, Clone)]
pub struct PatternSet {
    sources: Vec<String>,
    matcher: Option<Regex>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources: Vec<String> = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().to_string())
            .collect();

        if sources.is_empty() {
            return Ok(Self::empty());
        }

        // Validate alternatives one by one: `a)|(b` only compiles once joined.
        for source in &sources {
            Regex::new(source)?;
        }

        let alternatives = sources
            .iter()
            .map(|source| format!("(?:{source})"))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = Regex::new(&format!("^(?:{alternatives})$"))?;

        Ok(Self {
            sources,
            matcher: Some(matcher),
        })
    }

    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            matcher: None,
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.matcher
            .as_ref()
            .map(|matcher| matcher.is_match(value))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}
