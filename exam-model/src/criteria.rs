use std::fmt;
use std::str::FromStr;

use crate::{QuestionSourceId, UniversityId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown rotation {0:?} (expected R1, R2, R3 or R4)")]
    Rotation(String),
    #[error("unknown question type {0:?} (expected SINGLE_CHOICE or MULTIPLE_CHOICE)")]
    QuestionType(String),
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Rotation {
    R1,
    R2,
    R3,
    R4,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R1, Rotation::R2, Rotation::R3, Rotation::R4];

    pub fn label(&self) -> &'static str {
        match self {
            Rotation::R1 => "R1",
            Rotation::R2 => "R2",
            Rotation::R3 => "R3",
            Rotation::R4 => "R4",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rotation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rotation::ALL
            .into_iter()
            .find(|rotation| rotation.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Rotation(s.to_string()))
    }
}

/// Question type as students see it.
///
/// The remote API spells the multiple-choice variant `MULTIPLE_CHOICES`, so that is what goes on
/// the wire. Both spellings are accepted when reading.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum QuestionType {
    #[serde(rename = "SINGLE_CHOICE")]
    SingleChoice,
    #[serde(rename = "MULTIPLE_CHOICES", alias = "MULTIPLE_CHOICE")]
    MultipleChoice,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::SingleChoice, QuestionType::MultipleChoice];

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
        }
    }

    pub fn wire_label(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICES",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuestionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        QuestionType::ALL
            .into_iter()
            .find(|ty| ty.label().eq_ignore_ascii_case(s) || ty.wire_label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::QuestionType(s.to_string()))
    }
}

/// Everything besides the hierarchy selection that narrows down the question pool.
///
/// University, source and year are required before a session can be counted or created; rotation
/// and question type are optional. Unset is always `None`, there is no "all" value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub university: Option<UniversityId>,
    pub source: Option<QuestionSourceId>,
    pub year: Option<u16>,
    pub rotation: Option<Rotation>,
    pub question_type: Option<QuestionType>,
}

/// The required part of [`FilterCriteria`], only obtainable once all of it is set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequiredCriteria {
    pub university: UniversityId,
    pub source: QuestionSourceId,
    pub year: u16,
}

impl FilterCriteria {
    pub fn required(&self) -> Option<RequiredCriteria> {
        Some(RequiredCriteria {
            university: self.university?,
            source: self.source?,
            year: self.year?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.required().is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }
}
