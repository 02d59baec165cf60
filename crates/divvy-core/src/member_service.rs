//! CRUD orchestration for ledger members.

use uuid::Uuid;

use divvy_domain::{Ledger, Member};

use crate::CoreError;

pub struct MemberService;

impl MemberService {
    /// Adds a member, rejecting duplicate ids and display names.
    pub fn add(ledger: &mut Ledger, member: Member) -> Result<Uuid, CoreError> {
        if ledger.has_member(member.id) {
            return Err(CoreError::InvalidOperation(format!(
                "member {} already in ledger",
                member.id
            )));
        }
        if member.display_name.trim().is_empty() {
            return Err(CoreError::InvalidOperation(
                "member name must not be empty".into(),
            ));
        }
        if ledger.member_by_name(&member.display_name).is_some() {
            return Err(CoreError::InvalidOperation(format!(
                "a member named `{}` already exists",
                member.display_name
            )));
        }
        Ok(ledger.add_member(member))
    }

    pub fn rename(
        ledger: &mut Ledger,
        member_id: Uuid,
        new_name: impl Into<String>,
    ) -> Result<(), CoreError> {
        let new_name = new_name.into();
        let Some(member) = ledger.members.iter_mut().find(|m| m.id == member_id) else {
            return Err(CoreError::MemberNotFound(member_id.to_string()));
        };
        member.display_name = new_name;
        ledger.touch();
        Ok(())
    }

    /// Removes a member, cascading through the expense list (expenses they
    /// paid are pruned, their shares are stripped everywhere else).
    pub fn remove(ledger: &mut Ledger, member_id: Uuid) -> Result<(), CoreError> {
        if !ledger.has_member(member_id) {
            return Err(CoreError::MemberNotFound(member_id.to_string()));
        }
        ledger.remove_member(member_id);
        Ok(())
    }
}
