//! Composition of the multipart analysis request.

use pharmaguard_common::DrugCode;

use crate::intake::GenomicFile;
use crate::selector::DrugSelection;

pub const FILE_FIELD: &str = "file";
pub const DRUGS_FIELD: &str = "drugs";
pub const VCF_MIME: &str = "text/x-vcf";

/// One dispatch worth of input. Built at dispatch time and dropped after the
/// call; owns copies so the intake and selector stay editable meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    file: GenomicFile,
    drugs: Vec<DrugCode>,
}

/// A single multipart field, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField<'a> {
    File { name: &'static str, file_name: &'a str, mime: &'static str, bytes: &'a [u8] },
    Text { name: &'static str, value: &'static str },
}

impl AnalysisRequest {
    /// Returns `None` unless a file is present and at least one drug is selected.
    pub fn compose(file: Option<&GenomicFile>, drugs: &DrugSelection) -> Option<Self> {
        let file = file?;
        if drugs.is_empty() {
            return None;
        }
        Some(Self {
            file: file.clone(),
            drugs: drugs.iter().collect(),
        })
    }

    pub fn file(&self) -> &GenomicFile {
        &self.file
    }

    pub fn drugs(&self) -> &[DrugCode] {
        &self.drugs
    }

    /// The file part first, then one `drugs` field per selected code.
    pub fn form_fields(&self) -> Vec<FormField<'_>> {
        let mut fields = Vec::with_capacity(1 + self.drugs.len());
        fields.push(FormField::File {
            name: FILE_FIELD,
            file_name: self.file.name(),
            mime: VCF_MIME,
            bytes: self.file.content(),
        });
        fields.extend(self.drugs.iter().map(|d| FormField::Text {
            name: DRUGS_FIELD,
            value: d.as_str(),
        }));
        fields
    }
}
