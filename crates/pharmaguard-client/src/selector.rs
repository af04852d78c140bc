//! Medication multi-select and its outside-click disclosure.

use std::collections::HashSet;
use std::hash::Hash;

use pharmaguard_common::DrugCode;

/// Unique set of drugs, iterated in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugSelection {
    drugs: Vec<DrugCode>,
}

impl DrugSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `code` when absent, remove it when present. Returns whether the
    /// drug is selected afterwards.
    pub fn toggle(&mut self, code: DrugCode) -> bool {
        if let Some(pos) = self.drugs.iter().position(|d| *d == code) {
            self.drugs.remove(pos);
            false
        } else {
            self.drugs.push(code);
            true
        }
    }

    pub fn contains(&self, code: DrugCode) -> bool {
        self.drugs.contains(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = DrugCode> + '_ {
        self.drugs.iter().copied()
    }

    pub fn as_slice(&self) -> &[DrugCode] {
        &self.drugs
    }

    /// Membership view for order-insensitive comparisons.
    pub fn as_set(&self) -> HashSet<DrugCode> {
        self.drugs.iter().copied().collect()
    }
}

impl FromIterator<DrugCode> for DrugSelection {
    fn from_iter<I: IntoIterator<Item = DrugCode>>(iter: I) -> Self {
        let mut selection = DrugSelection::new();
        for code in iter {
            if !selection.contains(code) {
                selection.drugs.push(code);
            }
        }
        selection
    }
}

/// An area of the interface a component owns for pointer containment.
pub trait Region<T> {
    fn contains(&self, target: &T) -> bool;
}

/// Region made of an explicit set of element ids.
#[derive(Debug, Clone, Default)]
pub struct ElementRegion<T: Eq + Hash> {
    elements: HashSet<T>,
}

impl<T: Eq + Hash> ElementRegion<T> {
    pub fn new(elements: impl IntoIterator<Item = T>) -> Self {
        Self { elements: elements.into_iter().collect() }
    }
}

impl<T: Eq + Hash> Region<T> for ElementRegion<T> {
    fn contains(&self, target: &T) -> bool {
        self.elements.contains(target)
    }
}

/// Open/closed state that closes on pointer-downs outside its region.
#[derive(Debug, Clone, Default)]
pub struct Disclosure {
    open: bool,
}

impl Disclosure {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Handle a global pointer-down. Returns true when it closed the disclosure.
    pub fn on_pointer_down<T, R: Region<T>>(&mut self, region: &R, target: &T) -> bool {
        if self.open && !region.contains(target) {
            self.open = false;
            return true;
        }
        false
    }
}

/// Element ids rendered by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorElement {
    Header,
    List,
    Item(DrugCode),
}

/// Any element a pointer event can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    Selector(SelectorElement),
    Outside,
}

/// Catalog entry with its checked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: DrugCode,
    pub gene: &'static str,
    pub selected: bool,
}

pub struct MedicationSelector {
    selection: DrugSelection,
    disclosure: Disclosure,
    region: ElementRegion<PointerTarget>,
}

impl Default for MedicationSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationSelector {
    pub fn new() -> Self {
        let mut owned = vec![
            PointerTarget::Selector(SelectorElement::Header),
            PointerTarget::Selector(SelectorElement::List),
        ];
        owned.extend(
            DrugCode::ALL
                .iter()
                .map(|c| PointerTarget::Selector(SelectorElement::Item(*c))),
        );
        Self {
            selection: DrugSelection::new(),
            disclosure: Disclosure::default(),
            region: ElementRegion::new(owned),
        }
    }

    pub fn selection(&self) -> &DrugSelection {
        &self.selection
    }

    pub fn toggle_drug(&mut self, code: DrugCode) -> bool {
        let selected = self.selection.toggle(code);
        tracing::debug!(drug = %code, selected, "Toggled drug");
        selected
    }

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    pub fn toggle_open(&mut self) {
        self.disclosure.toggle();
    }

    pub fn on_pointer_down(&mut self, target: &PointerTarget) -> bool {
        self.disclosure.on_pointer_down(&self.region, target)
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        DrugCode::ALL
            .iter()
            .map(|&code| CatalogEntry {
                code,
                gene: code.primary_gene(),
                selected: self.selection.contains(code),
            })
            .collect()
    }

    /// Header text of the dropdown.
    pub fn summary(&self) -> String {
        if self.selection.is_empty() {
            "Select medications...".to_string()
        } else {
            self.selection
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// Label of the analyse button for the current state.
    pub fn submit_hint(&self, file_present: bool, busy: bool) -> &'static str {
        if busy {
            "Running Full LLM Analysis..."
        } else if !file_present {
            "Upload VCF to enable analysis"
        } else if self.selection.is_empty() {
            "Select drugs to analyze"
        } else {
            "Generate Comprehensive Report"
        }
    }
}
