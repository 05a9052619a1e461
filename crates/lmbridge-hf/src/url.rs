//! URL construction helpers.

use url::Url;

use crate::error::HfResult;

/// Index URL: `{host}/api/models/{repo_id}/tree/main[/{subpath}]`.
pub fn build_tree_url(host: &str, repo_id: &str, subpath: Option<&str>) -> HfResult<Url> {
    let host = host.trim_end_matches('/');
    let url = subpath.map_or_else(
        || format!("{host}/api/models/{repo_id}/tree/main"),
        |p| format!("{host}/api/models/{repo_id}/tree/main/{p}"),
    );
    Ok(Url::parse(&url)?)
}

/// Base that file paths are appended to: `{host}/{repo_id}/resolve/main`.
pub fn build_resolve_base(host: &str, repo_id: &str) -> String {
    format!("{}/{repo_id}/resolve/main", host.trim_end_matches('/'))
}

/// URL of one file under a resolve base (or of a subdirectory under an index base).
pub fn build_file_url(base: &str, file_path: &str) -> HfResult<Url> {
    Ok(Url::parse(&format!(
        "{}/{}",
        base.trim_end_matches('/'),
        file_path.trim_start_matches('/')
    ))?)
}

/// Both URLs needed to acquire one repository from one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUrls {
    pub host: String,
    pub index: String,
    pub resolve: String,
}

impl HostUrls {
    pub fn new(host: &str, repo_id: &str) -> HfResult<Self> {
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            index: build_tree_url(host, repo_id, None)?.to_string(),
            resolve: build_resolve_base(host, repo_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_url_root_and_subdir() {
        assert_eq!(
            build_tree_url("https://huggingface.co", "PowerServe/m", None)
                .unwrap()
                .as_str(),
            "https://huggingface.co/api/models/PowerServe/m/tree/main"
        );
        assert_eq!(
            build_tree_url("https://hf-mirror.com/", "PowerServe/m", Some("qnn"))
                .unwrap()
                .as_str(),
            "https://hf-mirror.com/api/models/PowerServe/m/tree/main/qnn"
        );
    }

    #[test]
    fn file_url_joins_without_double_slash() {
        let base = build_resolve_base("https://huggingface.co", "PowerServe/m");
        assert_eq!(base, "https://huggingface.co/PowerServe/m/resolve/main");
        assert_eq!(
            build_file_url(&base, "ggml/weights.gguf").unwrap().as_str(),
            "https://huggingface.co/PowerServe/m/resolve/main/ggml/weights.gguf"
        );
        assert_eq!(
            build_file_url(&format!("{base}/"), "/a").unwrap().as_str(),
            "https://huggingface.co/PowerServe/m/resolve/main/a"
        );
    }

    #[test]
    fn host_urls_pair() {
        let urls = HostUrls::new("https://hf-mirror.com", "PowerServe/x").unwrap();
        assert_eq!(urls.host, "https://hf-mirror.com");
        assert!(urls.index.ends_with("/api/models/PowerServe/x/tree/main"));
        assert!(urls.resolve.ends_with("/PowerServe/x/resolve/main"));
    }

    #[test]
    fn bad_host_is_an_error() {
        assert!(build_tree_url("not a host", "a/b", None).is_err());
    }
}
