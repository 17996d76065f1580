pub const DEFAULT_TERMS: &[&str] = &[
    "习近平", "毛泽东", "邓小平", "江泽民", "胡锦涛", "温家宝", "李克强", "共产党", "国民党",
    "民进党", "台独", "藏独", "疆独", "港独", "六四", "天安门", "法轮功", "邪教", "反动", "颠覆",
];

/// Case-insensitive substring matcher over a fixed term list.
#[derive(Debug, Clone)]
pub struct Denylist {
    terms: Vec<String>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_TERMS.iter().copied())
    }
}

impl Denylist {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| term.as_ref().trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.terms.iter().any(|term| name.contains(term.as_str()))
    }
}
