use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// The loss used for training the model.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Loss {
    /// Pointwise logistic loss, uses both positive and negative interactions.
    Logistic,
    /// Bayesian Personalised Ranking.
    Bpr,
    /// Weighted Approximate-Rank Pairwise.
    Warp,
    /// k-th order statistic WARP.
    WarpKos,
}

impl Loss {
    pub fn as_str(&self) -> &'static str {
        match self {
            Loss::Logistic => "logistic",
            Loss::Bpr => "bpr",
            Loss::Warp => "warp",
            Loss::WarpKos => "warp-kos",
        }
    }

    pub fn is_ranking(&self) -> bool {
        match self {
            Loss::Logistic => false,
            Loss::Bpr | Loss::Warp | Loss::WarpKos => true,
        }
    }
}

impl Default for Loss {
    fn default() -> Self {
        Loss::Warp
    }
}

impl FromStr for Loss {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "logistic" => Ok(Loss::Logistic),
            "bpr" => Ok(Loss::Bpr),
            "warp" => Ok(Loss::Warp),
            "warp-kos" | "warp_kos" => Ok(Loss::WarpKos),
            other => Err(ErrorKind::UnknownLoss(other.into())),
        }
    }
}

impl Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_losses() {
        assert_eq!("logistic".parse(), Ok(Loss::Logistic));
        assert_eq!("BPR".parse(), Ok(Loss::Bpr));
        assert_eq!(" warp ".parse(), Ok(Loss::Warp));
        assert_eq!("warp_kos".parse(), Ok(Loss::WarpKos));
        assert_eq!(Loss::WarpKos.to_string(), "warp-kos");
    }

    #[test]
    fn unknown_loss_is_rejected() {
        assert_eq!(
            "hinge".parse::<Loss>(),
            Err(ErrorKind::UnknownLoss("hinge".into()))
        );
    }
}
