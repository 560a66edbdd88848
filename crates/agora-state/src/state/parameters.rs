use serde::Deserialize;

use super::*;

/// Committee size used when genesis does not name one.
pub const DEFAULT_COMMITTEE_SIZE: u32 = 3;

/// Parameters fixed at genesis, read from the `app_state` of the genesis document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// How many validators sit on the consensus committee.
    #[serde(default = "default_committee_size")]
    pub committee_size: u32,
    /// Identifiers of posts flagged as spam by moderation.
    #[serde(default)]
    pub spam: Vec<ObjectId>,
}

fn default_committee_size() -> u32 {
    DEFAULT_COMMITTEE_SIZE
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            committee_size: DEFAULT_COMMITTEE_SIZE,
            spam: Vec::new(),
        }
    }
}

impl Parameters {
    /// Parse the genesis app state; an empty or `null` app state means all defaults.
    pub fn from_genesis(app_state_bytes: &[u8]) -> Result<Self, Report> {
        let parameters = if app_state_bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice::<Option<Parameters>>(app_state_bytes)?
        }
        .unwrap_or_default();

        if parameters.committee_size == 0 {
            bail!("committee size must be at least 1");
        }

        Ok(parameters)
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Get the genesis parameters from the state.
    pub async fn parameters(&self) -> Result<Parameters, Report> {
        self.store
            .get::<Parameters>(Internal, "parameters/genesis")
            .await?
            .ok_or_eyre("parameters not found in state; is the state initialized?")
    }

    /// Set the genesis parameters in the state.
    ///
    /// This should only be called once, during initial setup.
    pub(crate) async fn set_parameters(&mut self, parameters: &Parameters) -> Result<(), Report> {
        if self.parameters().await.is_ok() {
            bail!("parameters are already set; cannot set them again");
        }

        self.store.put(Internal, "parameters/genesis", parameters)?;
        for id in &parameters.spam {
            self.store
                .put(Internal, &format!("parameters/spam/{id}"), &true)?;
        }

        Ok(())
    }

    /// Whether moderation flagged the post with this identifier as spam.
    pub async fn is_flagged_spam(&self, id: &ObjectId) -> Result<bool, Report> {
        Ok(self
            .store
            .get::<bool>(Internal, &format!("parameters/spam/{id}"))
            .await?
            .unwrap_or(false))
    }
}
