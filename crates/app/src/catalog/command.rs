//! Command catalog: a view over the commands embedded in device profiles.

use metacat_domain::command::{Command, CommandPatch};
use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::error::{LimitExceededError, MetacatError, NotFoundError, ValidationError};
use metacat_domain::reference::Reference;

use crate::catalog::Context;
use crate::integrity::command_names;
use crate::ports::{DocumentStore, Filter};

/// Application service for commands.
///
/// Commands are created through their profile and cannot be deleted on
/// their own: the owning profile always references them.
pub struct CommandCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> CommandCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    /// Every command of every profile.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<Command>, MetacatError> {
        let profiles: Vec<DeviceProfile> = self.ctx.store.list().await?;
        let commands: Vec<Command> = profiles.into_iter().flat_map(|p| p.commands).collect();
        let limit = self.ctx.store.limits().max_results;
        if commands.len() > limit {
            return Err(LimitExceededError {
                collection: "command",
                limit,
            }
            .into());
        }
        Ok(commands)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no profile owns a command
    /// with `id`.
    pub async fn get(&self, id: &str) -> Result<Command, MetacatError> {
        let (mut profile, index) = self.owner_by_id(id).await?;
        Ok(profile.commands.swap_remove(index))
    }

    /// Command names are only unique within a profile, so a name lookup
    /// may match several commands.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Command>, MetacatError> {
        let profiles: Vec<DeviceProfile> = self.ctx.store.find(&by_name(name)).await?;
        Ok(profiles
            .into_iter()
            .flat_map(|p| p.commands)
            .filter(|c| c.name == name)
            .collect())
    }

    /// Merge `patch` into the command it identifies and persist the owning
    /// profile.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a name
    /// shared by commands of several profiles or a rename that collides
    /// inside the profile; [`MetacatError::NotFound`] for an unknown command.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: CommandPatch) -> Result<(), MetacatError> {
        let (mut profile, index) = match patch.identity.target()? {
            Reference::ById(id) => self.owner_by_id(&id).await?,
            reference => self.owner_by_name(reference.key()).await?,
        };
        let current = profile.commands[index].clone();
        if let Some(new_name) = patch.identity.rename_from(&current.name) {
            self.ctx.guard.may_rename(&current, new_name).await?;
            let siblings: Vec<Command> = profile
                .commands
                .iter()
                .filter(|c| c.id != current.id)
                .cloned()
                .collect();
            command_names::validate(&siblings, Some(new_name))?;
            profile.commands[index].name = new_name.to_owned();
        }
        let command = &mut profile.commands[index];
        patch.apply(command);
        command.audit.touch();
        command.validate()?;
        profile.audit.touch();
        self.ctx.store.replace(&profile).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown id, otherwise the
    /// guard's refusal: the owning profile still references the command.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let command = self.get(id).await?;
        self.ctx.guard.may_delete(&command).await?;
        // Unreachable while commands live inside their profile.
        Err(NotFoundError::new("command", id).into())
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let (profile, index) = self.owner_by_name(name).await?;
        self.ctx.guard.may_delete(&profile.commands[index]).await?;
        Err(NotFoundError::new("command", name).into())
    }

    async fn owner_by_id(&self, id: &str) -> Result<(DeviceProfile, usize), MetacatError> {
        let filter = Filter::contains_where("commands", "id", id);
        let profile: DeviceProfile = self
            .ctx
            .store
            .find_one(&filter)
            .await?
            .ok_or_else(|| NotFoundError::new("command", id))?;
        let index = position(&profile, |c| c.id.to_string() == id)
            .ok_or_else(|| NotFoundError::new("command", id))?;
        Ok((profile, index))
    }

    async fn owner_by_name(&self, name: &str) -> Result<(DeviceProfile, usize), MetacatError> {
        let mut profiles: Vec<DeviceProfile> = self.ctx.store.find(&by_name(name)).await?;
        if profiles.len() > 1 {
            return Err(ValidationError::NameNotUnique(name.to_owned()).into());
        }
        let profile = profiles
            .pop()
            .ok_or_else(|| NotFoundError::new("command", name))?;
        let index = position(&profile, |c| c.name == name)
            .ok_or_else(|| NotFoundError::new("command", name))?;
        Ok((profile, index))
    }
}

fn by_name(name: &str) -> Filter {
    Filter::contains_where("commands", "name", name)
}

fn position(profile: &DeviceProfile, predicate: impl Fn(&Command) -> bool) -> Option<usize> {
    profile.commands.iter().position(predicate)
}

#[cfg(test)]
mod tests {
    use metacat_domain::command::CommandAction;
    use metacat_domain::patch::Identity;

    use super::*;
    use crate::catalog::DeviceProfileCatalog;
    use crate::catalog::testing;
    use crate::memory::fixtures;

    async fn catalogs() -> (
        CommandCatalog<crate::memory::InMemoryStore>,
        DeviceProfileCatalog<crate::memory::InMemoryStore>,
    ) {
        let ctx = testing::context();
        let profiles = DeviceProfileCatalog::new(ctx.clone());
        profiles
            .create(fixtures::profile("P1", &["C1", "C2"]))
            .await
            .unwrap();
        profiles
            .create(fixtures::profile("P2", &["C1"]))
            .await
            .unwrap();
        (CommandCatalog::new(ctx), profiles)
    }

    #[tokio::test]
    async fn should_list_commands_across_profiles() {
        let (commands, _) = catalogs().await;
        assert_eq!(commands.list().await.unwrap().len(), 3);
        assert_eq!(commands.get_by_name("C1").await.unwrap().len(), 2);
        assert_eq!(commands.get_by_name("C2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_get_command_by_id() {
        let (commands, profiles) = catalogs().await;
        let p1 = profiles.get_by_name("P1").await.unwrap();
        let c2 = &p1.commands[1];
        assert_eq!(&commands.get(&c2.id.to_string()).await.unwrap(), c2);
        assert!(matches!(
            commands.get("unknown").await,
            Err(MetacatError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_reject_rename_colliding_inside_profile() {
        let (commands, profiles) = catalogs().await;
        let p1 = profiles.get_by_name("P1").await.unwrap();
        let c2 = p1.commands[1].id;

        let err = commands
            .update(CommandPatch {
                identity: Identity::by_id(c2).renamed("C1"),
                ..CommandPatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::DuplicateCommandName(_))
        ));

        commands
            .update(CommandPatch {
                identity: Identity::by_id(c2).renamed("C3"),
                ..CommandPatch::default()
            })
            .await
            .unwrap();
        let p1 = profiles.get_by_name("P1").await.unwrap();
        assert_eq!(p1.commands[1].name, "C3");
        assert!(p1.audit.modified > p1.audit.created);
    }

    #[tokio::test]
    async fn should_refuse_ambiguous_name_update() {
        let (commands, _) = catalogs().await;
        let err = commands
            .update(CommandPatch {
                identity: Identity::by_name("C1"),
                ..CommandPatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::NameNotUnique(_))
        ));
    }

    #[tokio::test]
    async fn should_update_actions_by_unique_name() {
        let (commands, _) = catalogs().await;
        commands
            .update(CommandPatch {
                identity: Identity::by_name("C2"),
                get: Some(CommandAction {
                    path: "/api/v1/device/{deviceId}/c2".to_string(),
                    ..CommandAction::default()
                }),
                ..CommandPatch::default()
            })
            .await
            .unwrap();
        let c2 = commands.get_by_name("C2").await.unwrap();
        assert_eq!(c2[0].get.as_ref().unwrap().path, "/api/v1/device/{deviceId}/c2");
    }

    #[tokio::test]
    async fn should_always_refuse_standalone_delete() {
        let (commands, profiles) = catalogs().await;
        let p1 = profiles.get_by_name("P1").await.unwrap();
        let err = commands
            .delete_by_id(&p1.commands[0].id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::StillReferenced { .. })
        ));
        assert_eq!(commands.list().await.unwrap().len(), 3);
    }
}
