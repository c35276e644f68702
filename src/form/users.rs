use crate::service::Fragment;

/// One user-access row: a rendered fragment carrying the user name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccessRow {
    id: u32,
    pub user_name: String,
    pub html: String,
}

impl UserAccessRow {
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Users granted access to the configuration, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAccessList {
    rows: Vec<UserAccessRow>,
    next_row: u32,
}

impl UserAccessList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[UserAccessRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, user_name: impl Into<String>, fragment: Fragment) -> u32 {
        let id = self.next_row;
        self.next_row += 1;
        let user_name = user_name.into();
        tracing::debug!(row = id, user = %user_name, "user access row added");
        self.rows.push(UserAccessRow {
            id,
            user_name,
            html: fragment.html,
        });
        id
    }

    pub fn remove(&mut self, id: u32) -> Option<UserAccessRow> {
        let idx = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(idx))
    }

    /// Append the rows stored for an existing configuration. An empty
    /// fragment means there is nothing to show.
    pub fn load<I, S>(&mut self, html: String, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if html.is_empty() {
            return;
        }
        for user in users {
            self.push(user, Fragment::default());
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.user_name.clone()).collect()
    }
}
