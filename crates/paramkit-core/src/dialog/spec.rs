use crate::{
    ParamKind,
    dialog::{ControlKind, ValueTransform},
};

///
/// SpinRange
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub decimals: u32,
}

impl SpinRange {
    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64, decimals: u32) -> Self {
        Self {
            min,
            max,
            step,
            decimals,
        }
    }
}

///
/// ControlSpec
///
/// One widget of a dialog, bound to one parameter of one class.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ControlSpec {
    pub id: String,
    pub group: usize,
    pub row: usize,
    pub class: String,
    pub param: usize,
    pub name: String,
    pub kind: ParamKind,
    pub control: ControlKind,
    pub transform: ValueTransform,
    pub label: String,
    pub tooltip: String,
    pub companion: Option<String>,
    pub items: Vec<String>,
    pub range: Option<SpinRange>,
    pub filter: Option<String>,
    pub extension: Option<String>,
}

impl ControlSpec {
    pub fn new(
        id: impl Into<String>,
        class: impl Into<String>,
        param: usize,
        name: impl Into<String>,
        kind: ParamKind,
        control: ControlKind,
    ) -> Self {
        let name = name.into();

        Self {
            id: id.into(),
            group: 0,
            row: 0,
            class: class.into(),
            param,
            label: name.clone(),
            name,
            kind,
            control,
            transform: ValueTransform::Identity,
            tooltip: String::new(),
            companion: None,
            items: Vec::new(),
            range: None,
            filter: None,
            extension: None,
        }
    }

    #[must_use]
    pub const fn at(mut self, group: usize, row: usize) -> Self {
        self.group = group;
        self.row = row;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: ValueTransform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_texts(mut self, label: impl Into<String>, tooltip: impl Into<String>) -> Self {
        self.label = label.into();
        self.tooltip = tooltip.into();
        self
    }

    #[must_use]
    pub fn with_companion(mut self, id: impl Into<String>) -> Self {
        self.companion = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_range(mut self, range: SpinRange) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extension = Some(name.into());
        self
    }
}

///
/// GroupSpec
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: String,
    pub title: String,
}

///
/// DialogSpec
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DialogSpec {
    pub name: String,
    pub title: String,
    pub groups: Vec<GroupSpec>,
    pub controls: Vec<ControlSpec>,
}

impl DialogSpec {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn group(mut self, name: impl Into<String>, title: impl Into<String>) -> Self {
        self.groups.push(GroupSpec {
            name: name.into(),
            title: title.into(),
        });
        self
    }

    #[must_use]
    pub fn control(mut self, control: ControlSpec) -> Self {
        self.controls.push(control);
        self
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<usize> {
        self.controls.iter().position(|c| c.id == id)
    }

    /// Controls of one group and row, in layout order.
    pub fn row(&self, group: usize, row: usize) -> impl Iterator<Item = &ControlSpec> {
        self.controls
            .iter()
            .filter(move |c| c.group == group && c.row == row)
    }
}
