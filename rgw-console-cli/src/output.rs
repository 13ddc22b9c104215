//! Human readable rendering of bucket policies.

use std::fmt;

use rgw_console_bucket_policy::Policy;

/// Statement-by-statement listing of a policy, one field per line.
pub struct PolicyListing<'a>(pub &'a Policy);

impl fmt::Display for PolicyListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = self.0;
        writeln!(f, "Policy: {}", policy.id.as_deref().unwrap_or("-"))?;

        for statement in &policy.statements {
            writeln!(f, "\tStatement: {}", statement.sid.as_deref().unwrap_or("-"))?;
            writeln!(f, "\tEffect: {}", statement.effect)?;
            writeln!(f, "\tActions:")?;
            for action in &statement.actions {
                writeln!(f, "\t\t{action}")?;
            }
            for principal in &statement.principals {
                writeln!(f, "\tUser: {}", principal.id)?;
            }
            for resource in &statement.resources {
                writeln!(f, "\tResource: {resource}")?;
            }
            writeln!(f, "\tConditions:")?;
            for condition in &statement.conditions {
                writeln!(f, "\t\tCondition type: {}", condition.condition_type)?;
                writeln!(f, "\t\t\tKey: {}", condition.condition_key)?;
                for value in &condition.values {
                    writeln!(f, "\t\t\tValue: {value}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
