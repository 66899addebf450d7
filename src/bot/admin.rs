//! Admin resolution for privileged commands.

use serenity::all::{GuildId, Role, RoleId, UserId};
use serenity::async_trait;
use serenity::http::Http;
use std::sync::Arc;

/// Decides whether a user may run admin commands.
#[async_trait]
pub trait AdminCheck: Send + Sync {
    async fn is_admin(&self, user_id: UserId) -> bool;
}

/// Resolves admins from the configured user list and the guild's roles.
pub struct DiscordAdminCheck {
    http: Arc<Http>,
    guild_id: GuildId,
    admin_user_ids: Vec<u64>,
}

impl DiscordAdminCheck {
    pub fn new(http: Arc<Http>, guild_id: GuildId, admin_user_ids: Vec<u64>) -> Self {
        Self {
            http,
            guild_id,
            admin_user_ids,
        }
    }
}

#[async_trait]
impl AdminCheck for DiscordAdminCheck {
    /// Whether the user may run admin commands.
    ///
    /// Users listed in the configuration are admins. Otherwise the user's roles are
    /// fetched and checked for the Administrator permission. Lookup failures deny.
    async fn is_admin(&self, user_id: UserId) -> bool {
        if self.admin_user_ids.contains(&user_id.get()) {
            return true;
        }

        let member = match self.http.get_member(self.guild_id, user_id).await {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!("Failed to fetch member {} for admin check: {}", user_id, e);
                return false;
            }
        };

        let roles = match self.http.get_guild_roles(self.guild_id).await {
            Ok(roles) => roles,
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch roles of guild {} for admin check: {}",
                    self.guild_id,
                    e
                );
                return false;
            }
        };

        has_admin_role(self.guild_id, &member.roles, &roles)
    }
}

/// Whether any of the member's roles, or the guild's @everyone role, grants
/// Administrator.
///
/// # Arguments
/// - `guild_id` - Guild ID, which is also the ID of its @everyone role
/// - `member_roles` - Role IDs held by the member
/// - `roles` - All roles of the guild
pub fn has_admin_role(guild_id: GuildId, member_roles: &[RoleId], roles: &[Role]) -> bool {
    roles
        .iter()
        .filter(|role| role.id.get() == guild_id.get() || member_roles.contains(&role.id))
        .any(|role| role.permissions.administrator())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serenity::create_test_role;

    const ADMINISTRATOR: u64 = 1 << 3;
    const SEND_MESSAGES: u64 = 1 << 11;
    const GUILD: u64 = 100;

    /// Tests that a member holding an Administrator role is an admin.
    #[test]
    fn admin_role_grants_admin() {
        let roles = vec![
            create_test_role(GUILD, "@everyone", SEND_MESSAGES, 0),
            create_test_role(200, "Ops", ADMINISTRATOR, 2),
        ];

        assert!(has_admin_role(
            GuildId::new(GUILD),
            &[RoleId::new(200)],
            &roles
        ));
    }

    /// Tests that roles the member does not hold are ignored.
    ///
    /// Expected: false although the guild has an admin role
    #[test]
    fn unheld_admin_role_is_ignored() {
        let roles = vec![
            create_test_role(GUILD, "@everyone", SEND_MESSAGES, 0),
            create_test_role(200, "Ops", ADMINISTRATOR, 2),
            create_test_role(300, "Member", SEND_MESSAGES, 1),
        ];

        assert!(!has_admin_role(
            GuildId::new(GUILD),
            &[RoleId::new(300)],
            &roles
        ));
    }

    /// Tests that Administrator on @everyone applies to every member.
    #[test]
    fn everyone_role_applies_to_all() {
        let roles = vec![create_test_role(GUILD, "@everyone", ADMINISTRATOR, 0)];

        assert!(has_admin_role(GuildId::new(GUILD), &[], &roles));
    }
}
