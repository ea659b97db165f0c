use crate::Error;

///
/// Choice
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Choice {
    pub name: &'static str,
    pub label: &'static str,
    pub doc: &'static str,
}

impl Choice {
    #[must_use]
    pub const fn new(name: &'static str, label: &'static str, doc: &'static str) -> Self {
        Self { name, label, doc }
    }
}

///
/// ChoiceTable
///
/// Ordered, named options (draw styles, edit modes). Lookups by unknown name
/// come in two flavours: `find` is silent, `resolve` reports the miss.
///

#[derive(Clone, Copy, Debug)]
pub struct ChoiceTable {
    pub set: &'static str,
    pub choices: &'static [Choice],
}

impl ChoiceTable {
    #[must_use]
    pub const fn new(set: &'static str, choices: &'static [Choice]) -> Self {
        Self { set, choices }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&'static str> {
        self.choices.get(index).map(|c| c.name)
    }

    #[must_use]
    pub fn label_of(&self, index: usize) -> Option<&'static str> {
        self.choices.get(index).map(|c| c.label)
    }

    #[must_use]
    pub fn doc_of(&self, index: usize) -> Option<&'static str> {
        self.choices.get(index).map(|c| c.doc)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.choices.iter().position(|c| c.name == name)
    }

    pub fn resolve(&self, name: &str) -> Result<usize, Error> {
        self.find(name).ok_or_else(|| Error::UnknownIdentifier {
            set: self.set.to_string(),
            name: name.to_string(),
        })
    }

    /// Labels in order, as a combo box lists them.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.choices.iter().map(|c| c.label)
    }
}
