/// Options for loading CMap resources from disk
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// How many `usecmap` references may be followed from one resource
    pub max_usecmap_depth: usize,

    /// Keep loaded resources for later lookups of the same name
    pub cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            max_usecmap_depth: 16,
            cache: true,
        }
    }
}

impl LoadOptions {
    /// Create a builder for LoadOptions
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::default()
    }
}

/// Builder for LoadOptions
#[derive(Default)]
pub struct LoadOptionsBuilder {
    max_usecmap_depth: Option<usize>,
    cache: Option<bool>,
}

impl LoadOptionsBuilder {
    /// Set the maximum `usecmap` nesting
    pub fn max_usecmap_depth(mut self, value: usize) -> Self {
        self.max_usecmap_depth = Some(value);
        self
    }

    /// Enable or disable caching of loaded resources
    pub fn cache(mut self, value: bool) -> Self {
        self.cache = Some(value);
        self
    }

    /// Build the LoadOptions
    pub fn build(self) -> LoadOptions {
        let defaults = LoadOptions::default();
        LoadOptions {
            max_usecmap_depth: self.max_usecmap_depth.unwrap_or(defaults.max_usecmap_depth),
            cache: self.cache.unwrap_or(defaults.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_defaults() {
        let options = LoadOptions::builder().cache(false).build();
        assert!(!options.cache);
        assert_eq!(options.max_usecmap_depth, 16);

        let options = LoadOptions::builder().max_usecmap_depth(2).build();
        assert!(options.cache);
        assert_eq!(options.max_usecmap_depth, 2);
    }
}
