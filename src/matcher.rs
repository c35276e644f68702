//! Pure field predicates. Nothing here touches form state; callers decide how
//! a failure is displayed.

use std::sync::LazyLock;

use regex::Regex;

static PROJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

static USER_CONFIG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").unwrap());

// Not anchored at the start: anything that ends in a recognisable remote passes.
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((git|ssh|https?)|(git@[A-Za-z0-9_.]+))(:/?)([A-Za-z0-9_.@:/\-~]+)(\.git)?$")
        .unwrap()
});

static FILE_TO_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^([a-zA-Z]:\\)?[^\x00-\x1F"<>|:*?/]+\.[a-zA-Z]{3,5}$"#).unwrap()
});

// Folder/file segments; `/*`, `/**` and a trailing `/*.*` are the only wildcards.
static ANT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:[^\\/:"*?<>|\r\n]+?(?:/?|/\*{0,2})*?|/\*\.\*$)*?$"#).unwrap()
});

// A lone dot-name, or relative segments none of which starts with a dot.
static LOCAL_DIRECTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\.[A-Za-z0-9]*$|^(?:[^.\\/:*?"<>|\r\n][^\\/:*?"<>|\r\n]*/?)*$"#).unwrap()
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    let word = r"[A-Za-z0-9_\-]";
    let quoted = r#""[A-Za-z0-9_\-\s]+""#;
    let dotted = format!(r"{word}+(?:\.{word}+)*");
    let octet = r"(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[0-9]{1,2})";
    let pattern = format!(
        r"(?i)^(({quoted})|({dotted})|({quoted})({dotted}))(@((?:{word}+\.)*[A-Za-z0-9_]{word}{{0,66}})\.([a-z]{{2,6}}(?:\.[a-z]{{2}})?)$)|(@\[?((25[0-5]\.|2[0-4][0-9]\.|1[0-9]{{2}}\.|[0-9]{{1,2}}\.))({octet}\.){{2}}{octet}\]?$)"
    );
    Regex::new(&pattern).unwrap()
});

pub const EMPTY_PROJECT_NAME: &str = " Please enter your project name";
pub const INVALID_PROJECT_NAME: &str = " This field may only contain alphanumeric characters, underscores or hyphens, and can't be empty.";

/// Which validation rule a text field is subject to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    ProjectName,
    Email,
    Url,
    FileToBuild,
    LocalDirectory,
    Artifact,
    VersionFile,
    UserConfig,
    /// Cron text; judged by the configuration service, never locally.
    Trigger,
    Free,
}

impl FieldKind {
    /// Message shown next to a field that fails its rule.
    pub fn error_message(self) -> &'static str {
        match self {
            FieldKind::ProjectName => INVALID_PROJECT_NAME,
            FieldKind::Email => " Invalid e-mail address",
            FieldKind::Url => " Invalid repository URL",
            FieldKind::FileToBuild => " Expected a file name with a 3 to 5 letter extension",
            FieldKind::LocalDirectory => " Expected '.', '.name' or a relative folder path",
            FieldKind::Artifact | FieldKind::VersionFile => {
                " Invalid path. Wildcards are allowed only after a folder separator"
            }
            FieldKind::UserConfig => {
                " Only alphanumeric characters, underscores or hyphens are allowed"
            }
            FieldKind::Trigger | FieldKind::Free => "",
        }
    }
}

/// Validate a project name, distinguishing an empty value from a malformed one.
pub fn project_name(value: &str) -> Result<(), &'static str> {
    if PROJECT_NAME.is_match(value) {
        Ok(())
    } else if value.is_empty() {
        Err(EMPTY_PROJECT_NAME)
    } else {
        Err(INVALID_PROJECT_NAME)
    }
}

/// A single address.
pub fn email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Space separated addresses; every one must pass. An empty field is fine.
pub fn emails(value: &str) -> bool {
    value.is_empty() || value.split(' ').all(email)
}

pub fn url(value: &str) -> bool {
    URL.is_match(value)
}

pub fn file_to_build(value: &str) -> bool {
    value.is_empty() || FILE_TO_BUILD.is_match(value)
}

pub fn local_directory(value: &str) -> bool {
    LOCAL_DIRECTORY.is_match(value)
}

pub fn ant_path(value: &str) -> bool {
    ANT_PATH.is_match(value)
}

pub fn user_config(value: &str) -> bool {
    USER_CONFIG.is_match(value)
}

/// Run the rule for `kind` against `value`.
pub fn matches(kind: FieldKind, value: &str) -> bool {
    match kind {
        FieldKind::ProjectName => project_name(value).is_ok(),
        FieldKind::Email => emails(value),
        FieldKind::Url => url(value),
        FieldKind::FileToBuild => file_to_build(value),
        FieldKind::LocalDirectory => local_directory(value),
        FieldKind::Artifact | FieldKind::VersionFile => ant_path(value),
        FieldKind::UserConfig => user_config(value),
        FieldKind::Trigger | FieldKind::Free => true,
    }
}

/// Like [`matches`], returning the message to display on failure.
pub fn check(kind: FieldKind, value: &str) -> Result<(), &'static str> {
    match kind {
        FieldKind::ProjectName => project_name(value),
        other if matches(other, value) => Ok(()),
        other => Err(other.error_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_messages_differ_for_empty_and_malformed() {
        assert!(project_name("core-lib_2").is_ok());
        assert_eq!(project_name(""), Err(EMPTY_PROJECT_NAME));
        assert_eq!(project_name("core lib"), Err(INVALID_PROJECT_NAME));
        assert_eq!(project_name("core/lib"), Err(INVALID_PROJECT_NAME));
        assert_ne!(EMPTY_PROJECT_NAME, INVALID_PROJECT_NAME);
    }

    #[test]
    fn emails_accept_space_separated_lists() {
        assert!(emails(""));
        assert!(emails("dev@example.com"));
        assert!(emails("dev@example.com ops.team@mail.example.org"));
        assert!(emails("root@[192.168.0.1]"));
        assert!(!emails("dev@example.com nope"));
        assert!(!emails("dev@example.com  ops@example.com"), "double space leaves an empty address");
        assert!(!emails("@example.com"));
    }

    #[test]
    fn urls_need_a_known_scheme_or_scp_form() {
        assert!(url("https://github.com/org/repo.git"));
        assert!(url("ssh://git@host:22/repo"));
        assert!(url("git@github.com:org/repo.git"));
        assert!(url("http://svn.example.com/trunk"));
        assert!(!url(""));
        assert!(!url("ftp://example.com/repo"));
        assert!(!url("github.com/org/repo"));
    }

    #[test]
    fn file_to_build_requires_extension() {
        assert!(file_to_build(""));
        assert!(file_to_build("Solution.sln"));
        assert!(file_to_build("C:\\src\\App.sln"));
        assert!(file_to_build("build.XML"));
        assert!(!file_to_build("App.csproj"), "six letter extensions are rejected");
        assert!(!file_to_build("Makefile"));
        assert!(!file_to_build("src/app.sln"), "forward slashes are reserved");
        assert!(!file_to_build("app.x"));
        assert!(!file_to_build("what?.sln"));
    }

    #[test]
    fn local_directory_allows_dot_names_and_relative_paths() {
        assert!(local_directory(""));
        assert!(local_directory("."));
        assert!(local_directory(".2"));
        assert!(local_directory("Development1"));
        assert!(local_directory("src/module/"));
        assert!(!local_directory(".."));
        assert!(!local_directory("../escape"));
        assert!(!local_directory("src/.hidden"));
        assert!(!local_directory("C:\\src"));
    }

    #[test]
    fn ant_paths_allow_wildcards_after_a_separator() {
        assert!(ant_path(""));
        assert!(ant_path("bin/Release"));
        assert!(ant_path("target/*.jar"));
        assert!(ant_path("build/**/out.dll"));
        assert!(!ant_path("*.jar"));
        assert!(!ant_path("?/bin"));
        assert!(!ant_path("bin\\Release"));
        assert!(!ant_path("a|b"));
    }

    #[test]
    fn user_config_allows_empty_override() {
        assert!(user_config(""));
        assert!(user_config("Release_x64"));
        assert!(!user_config("Release x64"));
    }

    #[test]
    fn check_returns_kind_specific_messages() {
        assert_eq!(check(FieldKind::Url, "nope"), Err(FieldKind::Url.error_message()));
        assert_eq!(check(FieldKind::ProjectName, ""), Err(EMPTY_PROJECT_NAME));
        assert!(check(FieldKind::Trigger, "not a cron").is_ok());
        assert!(check(FieldKind::Free, "anything at all").is_ok());
    }
}
