use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace
};

use crate::clock::DEFAULT_DATE_FORMAT;

pub const RC_ENV: &str = "KURIPPURC";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>,
  loading: Vec<PathBuf>
}

impl Config {
  /// Built-in settings, before any rc
  /// file or override.
  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![],
      loading:      vec![]
    };

    for (key, value) in [
      ("data.location", "~/.kurippu"),
      ("default.command", "list"),
      ("language", "en"),
      ("date.format", DEFAULT_DATE_FORMAT),
      ("storage.on_corrupt", "fail"),
      ("color", "on")
    ] {
      cfg.map.insert(
        key.to_string(),
        value.to_string()
      );
    }

    cfg
  }

  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let rc = resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading rc file");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no rc file found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    if self.loading.contains(&path) {
      return Err(anyhow!(
        "include cycle at {}",
        path.display()
      ));
    }
    self
      .loaded_files
      .push(path.clone());

    self.loading.push(path.clone());
    let result =
      self.apply_lines(&path, &text);
    self.loading.pop();
    result
  }

  fn apply_lines(
    &mut self,
    path: &Path,
    text: &str
  ) -> anyhow::Result<()> {
    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );
        self.load_file(&include_path)?;
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  if let Some(path) = override_dir {
    return Ok(path.to_path_buf());
  }
  if let Some(cfg_value) =
    cfg.get("data.location")
  {
    return Ok(expand_tilde(Path::new(
      &cfg_value
    )));
  }
  default_data_dir()
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    debug!(
      "cannot determine home \
       directory; skipping rc file"
    );
    return Ok(None);
  };
  let candidate = home.join(".kurippurc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home.join(".kurippu"))
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::{
    Config,
    resolve_data_dir
  };

  #[test]
  fn rc_file_with_comments_and_include()
  {
    let temp =
      tempdir().expect("tempdir");
    let shared =
      temp.path().join("shared.rc");
    fs::write(
      &shared,
      "date.format = %Y-%m-%d\n"
    )
    .expect("write include");

    let rc = temp.path().join("main.rc");
    fs::write(
      &rc,
      "# personal settings\nlanguage \
       = ml   # malayalam first\n\ninclude \
       shared.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc))
      .expect("load config");
    assert_eq!(
      cfg.get("language").as_deref(),
      Some("ml")
    );
    assert_eq!(
      cfg.get("date.format").as_deref(),
      Some("%Y-%m-%d")
    );
    assert_eq!(
      cfg.get("default.command").as_deref(),
      Some("list")
    );
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn malformed_line_is_reported() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("bad.rc");
    fs::write(&rc, "language ml\n")
      .expect("write rc");

    let err = Config::load(Some(&rc))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }

  #[test]
  fn self_include_is_rejected() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("loop.rc");
    fs::write(&rc, "include loop.rc\n")
      .expect("write rc");

    assert!(
      Config::load(Some(&rc)).is_err()
    );
  }

  #[test]
  fn shared_include_from_two_files() {
    let temp =
      tempdir().expect("tempdir");
    fs::write(
      temp.path().join("shared.rc"),
      "color = off\n"
    )
    .expect("write shared");
    fs::write(
      temp.path().join("a.rc"),
      "include shared.rc\nlanguage = ml\n"
    )
    .expect("write a");
    fs::write(
      temp.path().join("b.rc"),
      "include shared.rc\n"
    )
    .expect("write b");

    let rc = temp.path().join("main.rc");
    fs::write(
      &rc,
      "include a.rc\ninclude b.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc))
      .expect("diamond include loads");
    assert_eq!(
      cfg.get("language").as_deref(),
      Some("ml")
    );
    assert_eq!(
      cfg.get_bool("color"),
      Some(false)
    );
    assert_eq!(cfg.loaded_files.len(), 5);
  }

  #[test]
  fn indirect_include_cycle_is_rejected()
  {
    let temp =
      tempdir().expect("tempdir");
    fs::write(
      temp.path().join("a.rc"),
      "include b.rc\n"
    )
    .expect("write a");
    fs::write(
      temp.path().join("b.rc"),
      "include a.rc\n"
    )
    .expect("write b");

    let err = Config::load(Some(
      &temp.path().join("a.rc")
    ))
    .expect_err("cycle");
    assert!(
      format!("{err:#}")
        .contains("include cycle")
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides(vec![(
      "rc.color".to_string(),
      "off".to_string()
    )]);
    assert_eq!(
      cfg.get_bool("color"),
      Some(false)
    );
  }

  #[test]
  fn explicit_data_dir_wins() {
    let temp =
      tempdir().expect("tempdir");
    let mut cfg = Config::defaults();
    cfg.apply_overrides(vec![(
      "data.location".to_string(),
      "/somewhere/else".to_string()
    )]);

    let dir = resolve_data_dir(
      &cfg,
      Some(temp.path())
    )
    .expect("data dir");
    assert_eq!(dir, temp.path());

    let dir = resolve_data_dir(&cfg, None)
      .expect("data dir");
    assert_eq!(
      dir,
      std::path::PathBuf::from(
        "/somewhere/else"
      )
    );
  }
}
