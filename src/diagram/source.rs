/// The PlantUML text of one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    text: String,
}

impl DiagramSource {
    const START: &'static str = "@startuml";
    const END: &'static str = "@enduml";

    /// Wraps diagram text.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self { text }
    }

    /// The diagram text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text contains both `@startuml` and `@enduml`.
    ///
    /// A diagram without them is still rendered; the renderer decides what
    /// to make of it.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.text.contains(Self::START) && self.text.contains(Self::END)
    }
}

impl From<String> for DiagramSource {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
