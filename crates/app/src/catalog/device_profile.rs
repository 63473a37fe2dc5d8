//! Device profile catalog, including the commands a profile owns.

use metacat_domain::command::Command;
use metacat_domain::device_profile::{DeviceProfile, DeviceProfilePatch};
use metacat_domain::error::{MetacatError, NotFoundError};
use metacat_domain::id::{CommandId, DeviceProfileId};
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::integrity::command_names;
use crate::ports::{DocumentStore, Filter};

/// Application service for device profiles.
pub struct DeviceProfileCatalog<S> {
    ctx: Context<S>,
}

impl<S> Clone for DeviceProfileCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
        }
    }
}

impl<S: DocumentStore> DeviceProfileCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<DeviceProfile>, MetacatError> {
        self.ctx.store.list().await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no profile has `id`.
    pub async fn get(&self, id: &str) -> Result<DeviceProfile, MetacatError> {
        self.ctx.by_id(id).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no profile has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<DeviceProfile, MetacatError> {
        self.ctx.by_name(name).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> Result<Vec<DeviceProfile>, MetacatError> {
        self.ctx
            .store
            .find(&Filter::equals("manufacturer", manufacturer))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_model(&self, model: &str) -> Result<Vec<DeviceProfile>, MetacatError> {
        self.ctx.store.find(&Filter::equals("model", model)).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_label(&self, label: &str) -> Result<Vec<DeviceProfile>, MetacatError> {
        self.ctx.store.find(&Filter::contains("labels", label)).await
    }

    /// Persist a new profile together with its commands.
    ///
    /// Fresh ids are assigned to the profile and every command.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty name, a taken name
    /// or two commands sharing a name.
    #[tracing::instrument(skip(self, profile), fields(name = %profile.name))]
    pub async fn create(&self, mut profile: DeviceProfile) -> Result<DeviceProfileId, MetacatError> {
        profile.validate()?;
        command_names::validate(&profile.commands, None)?;
        let audit = Audit::stamp();
        profile.id = DeviceProfileId::new();
        profile.audit = audit;
        for command in &mut profile.commands {
            command.id = CommandId::new();
            command.audit = audit;
        }
        self.ctx.store.insert(&profile).await?;
        tracing::info!(id = %profile.id, commands = profile.commands.len(), "device profile created");
        Ok(profile.id)
    }

    /// Merge `patch` into the profile it identifies. A present command list
    /// replaces the stored one; a command keeps its id and creation stamp
    /// only when the id was already one of this profile's commands.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name, duplicate command names or ids; [`MetacatError::NotFound`] for
    /// an unknown target. Checks on the patch alone come first.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: DeviceProfilePatch) -> Result<(), MetacatError> {
        patch.validate()?;
        if let Some(commands) = &patch.commands {
            command_names::validate(commands, None)?;
        }
        let mut profile: DeviceProfile = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&profile, &patch.identity).await? {
            profile.name = name;
        }
        let previous = patch.commands.is_some().then(|| profile.commands.clone());
        patch.apply(&mut profile);
        if let Some(previous) = previous {
            restamp(&mut profile.commands, &previous);
        }
        profile.audit.touch();
        profile.validate()?;
        self.ctx.store.replace(&profile).await
    }

    /// Append one command to the profile with `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown profile and
    /// [`MetacatError::Validation`] when the name is empty or already used
    /// in the profile.
    #[tracing::instrument(skip(self, command), fields(command = %command.name))]
    pub async fn add_command(
        &self,
        profile_id: &str,
        mut command: Command,
    ) -> Result<CommandId, MetacatError> {
        command.validate()?;
        let mut profile: DeviceProfile = self.ctx.by_id(profile_id).await?;
        command_names::validate(&profile.commands, Some(&command.name))?;
        command.id = CommandId::new();
        command.audit = Audit::stamp();
        let id = command.id;
        profile.commands.push(command);
        profile.audit.touch();
        self.ctx.store.replace(&profile).await?;
        tracing::info!(%id, "command added");
        Ok(id)
    }

    /// Remove one command from the profile with `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown profile or command.
    #[tracing::instrument(skip(self))]
    pub async fn remove_command(&self, profile_id: &str, command_id: &str) -> Result<(), MetacatError> {
        let mut profile: DeviceProfile = self.ctx.by_id(profile_id).await?;
        let Some(position) = profile
            .commands
            .iter()
            .position(|c| c.id.to_string() == command_id)
        else {
            return Err(NotFoundError::new("command", command_id).into());
        };
        profile.commands.remove(position);
        profile.audit.touch();
        self.ctx.store.replace(&profile).await?;
        tracing::info!(command_id, "command removed");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] while devices, managers or
    /// provision watchers use the profile.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let profile: DeviceProfile = self.ctx.by_id(id).await?;
        self.ctx.remove(&profile).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let profile: DeviceProfile = self.ctx.by_name(name).await?;
        self.ctx.remove(&profile).await
    }
}

/// Carry creation stamps over from `previous` for commands whose id survived.
/// Any other id, including one owned by another profile, is replaced.
fn restamp(commands: &mut [Command], previous: &[Command]) {
    for command in commands {
        match previous.iter().find(|p| p.id == command.id) {
            Some(kept) => {
                command.audit = kept.audit;
                command.audit.touch();
            }
            None => {
                command.id = CommandId::new();
                command.audit = Audit::stamp();
            }
        }
    }
}
