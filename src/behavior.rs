use clap::ValueEnum;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Closed set of behavior classes. The model is trained with class id 0 as
/// slacking and class id 1 as working; extending the set means retraining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Behavior {
    Slacking,
    Working,
}

impl Behavior {
    /// Maps a model class id to a behavior. Ids outside the trained set are None.
    pub fn from_class_id(class_id: usize) -> Option<Behavior> {
        match class_id {
            0 => Some(Behavior::Slacking),
            1 => Some(Behavior::Working),
            _ => None,
        }
    }

    /// Directory and filename prefix used by the capture tool.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Behavior::Slacking => "slacking",
            Behavior::Working => "working",
        }
    }

    /// Label drawn on the detector overlay.
    pub fn display_label(&self) -> &'static str {
        match self {
            Behavior::Slacking => "Slacking off",
            Behavior::Working => "Working",
        }
    }

    pub fn is_slacking(&self) -> bool {
        matches!(self, Behavior::Slacking)
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::Behavior;

    #[test]
    fn test_class_id_mapping() {
        assert_eq!(Behavior::from_class_id(0), Some(Behavior::Slacking));
        assert_eq!(Behavior::from_class_id(1), Some(Behavior::Working));
        assert_eq!(Behavior::from_class_id(2), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Behavior::Slacking.dir_name(), "slacking");
        assert_eq!(Behavior::Slacking.display_label(), "Slacking off");
        assert!(Behavior::Slacking.is_slacking());
        assert!(!Behavior::Working.is_slacking());
    }
}
