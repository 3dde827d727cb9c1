/// What a caller must present before a method's handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    Public,
    /// `Authorization: Bearer <access token>`.
    AccessToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Login,
    Refresh,
    Logout,
    Validate,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Login,
        Method::Refresh,
        Method::Logout,
        Method::Validate,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Method::Login => "login",
            Method::Refresh => "refresh",
            Method::Logout => "logout",
            Method::Validate => "validate",
        }
    }

    // Exhaustive on purpose: a new method does not compile until it declares one.
    pub fn auth_requirement(self) -> AuthRequirement {
        match self {
            Method::Login | Method::Refresh | Method::Validate => AuthRequirement::Public,
            Method::Logout => AuthRequirement::AccessToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn only_logout_requires_an_access_token() {
        let guarded: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| m.auth_requirement() == AuthRequirement::AccessToken)
            .collect();

        assert_eq!(guarded, vec![Method::Logout]);
    }

    #[test]
    fn paths_are_unique() {
        let paths: HashSet<&str> = Method::ALL.into_iter().map(Method::path).collect();

        assert_eq!(paths.len(), Method::ALL.len());
    }
}
