//! Fixed naming facts for one generation run.
//!
//! Facts back the `Simple`, `Transformed` and `Macro` placeholders. The
//! builder accepts the primary names (file, package, project, ...) and
//! derives the rest: base name and extension from the file name,
//! `*ASIDENTIFIER` variants through the `identifier` transform, and the
//! `COPYRIGHT` / `FILEHEADER` macros. Anything set explicitly wins over a
//! derived value.

use std::collections::BTreeMap;
use std::path::Path;

use super::transform::Transform;

pub const FILENAME: &str = "FILENAME";
pub const FILEBASENAME: &str = "FILEBASENAME";
pub const FILEBASENAMEASIDENTIFIER: &str = "FILEBASENAMEASIDENTIFIER";
pub const FILEEXTENSION: &str = "FILEEXTENSION";
pub const PACKAGENAME: &str = "PACKAGENAME";
pub const PACKAGENAMEASIDENTIFIER: &str = "PACKAGENAMEASIDENTIFIER";
pub const PROJECTNAME: &str = "PROJECTNAME";
pub const PROJECTNAMEASIDENTIFIER: &str = "PROJECTNAMEASIDENTIFIER";
pub const PRODUCTNAME: &str = "PRODUCTNAME";
pub const TARGETNAME: &str = "TARGETNAME";
pub const ORGANIZATIONNAME: &str = "ORGANIZATIONNAME";
pub const FULLUSERNAME: &str = "FULLUSERNAME";
pub const USERNAME: &str = "USERNAME";
pub const WORKSPACENAME: &str = "WORKSPACENAME";
pub const DATE: &str = "DATE";
pub const TIME: &str = "TIME";
pub const YEAR: &str = "YEAR";

pub const FILEHEADER: &str = "FILEHEADER";
pub const COPYRIGHT: &str = "COPYRIGHT";

/// Names recognised as `Simple` / `Transformed` heads.
pub const BUILTIN_NAMES: &[&str] = &[
    FILENAME,
    FILEBASENAME,
    FILEBASENAMEASIDENTIFIER,
    FILEEXTENSION,
    PACKAGENAME,
    PACKAGENAMEASIDENTIFIER,
    PROJECTNAME,
    PROJECTNAMEASIDENTIFIER,
    PRODUCTNAME,
    TARGETNAME,
    ORGANIZATIONNAME,
    FULLUSERNAME,
    USERNAME,
    WORKSPACENAME,
    DATE,
    TIME,
    YEAR,
];

/// Zero-argument macros.
pub const MACRO_NAMES: &[&str] = &[FILEHEADER, COPYRIGHT];

/// Immutable name -> value table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingFacts {
    values: BTreeMap<String, String>,
}

impl NamingFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> NamingFactsBuilder {
        NamingFactsBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy with `name` set to `value`. Derived facts are not recomputed.
    pub fn with_fact(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

/// Collects primary names, then derives dependent facts in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct NamingFactsBuilder {
    file_name: Option<String>,
    package_name: Option<String>,
    project_name: Option<String>,
    product_name: Option<String>,
    target_name: Option<String>,
    organization_name: Option<String>,
    full_user_name: Option<String>,
    user_name: Option<String>,
    workspace_name: Option<String>,
    date: Option<String>,
    time: Option<String>,
    year: Option<String>,
    overrides: BTreeMap<String, String>,
}

macro_rules! setter {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(mut self, value: impl Into<String>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

impl NamingFactsBuilder {
    setter! {
        file_name => file_name,
        package_name => package_name,
        project_name => project_name,
        product_name => product_name,
        target_name => target_name,
        organization_name => organization_name,
        full_user_name => full_user_name,
        user_name => user_name,
        workspace_name => workspace_name,
        date => date,
        time => time,
        year => year,
    }

    /// Set any fact directly; wins over derivation.
    pub fn fact(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> NamingFacts {
        let mut values = BTreeMap::new();
        let mut put = |name: &str, value: Option<&String>| {
            if let Some(v) = value {
                values.insert(name.to_string(), v.clone());
            }
        };

        put(FILENAME, self.file_name.as_ref());
        put(PACKAGENAME, self.package_name.as_ref());
        put(PROJECTNAME, self.project_name.as_ref());
        put(PRODUCTNAME, self.product_name.as_ref());
        put(TARGETNAME, self.target_name.as_ref());
        put(ORGANIZATIONNAME, self.organization_name.as_ref());
        put(FULLUSERNAME, self.full_user_name.as_ref());
        put(USERNAME, self.user_name.as_ref());
        put(WORKSPACENAME, self.workspace_name.as_ref());
        put(DATE, self.date.as_ref());
        put(TIME, self.time.as_ref());
        put(YEAR, self.year.as_ref());

        if let Some(file_name) = &self.file_name {
            let (base, extension) = split_file_name(file_name);
            values.insert(FILEBASENAME.into(), base.to_string());
            values.insert(FILEEXTENSION.into(), extension.to_string());
        }

        // Overrides go in before the identifier and macro derivations so an
        // explicit FILEBASENAME still feeds FILEBASENAMEASIDENTIFIER.
        values.extend(self.overrides.clone());

        for (source, target) in [
            (FILEBASENAME, FILEBASENAMEASIDENTIFIER),
            (PACKAGENAME, PACKAGENAMEASIDENTIFIER),
            (PROJECTNAME, PROJECTNAMEASIDENTIFIER),
        ] {
            if values.contains_key(target) {
                continue;
            }
            if let Some(value) = values.get(source) {
                let derived = Transform::Identifier.apply(value);
                values.insert(target.into(), derived);
            }
        }

        if !values.contains_key(COPYRIGHT) {
            if let Some(copyright) = copyright_line(&values) {
                values.insert(COPYRIGHT.into(), copyright);
            }
        }
        if !values.contains_key(FILEHEADER) && values.contains_key(FILENAME) {
            let header = file_header(&values);
            values.insert(FILEHEADER.into(), header);
        }

        NamingFacts { values }
    }
}

fn split_file_name(file_name: &str) -> (&str, &str) {
    let path = Path::new(file_name);
    let base = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    (base, extension)
}

fn copyright_line(values: &BTreeMap<String, String>) -> Option<String> {
    let year = values.get(YEAR)?;
    Some(match values.get(ORGANIZATIONNAME) {
        Some(org) if !org.is_empty() => format!("Copyright © {year} {org}. All rights reserved."),
        _ => format!("Copyright © {year}"),
    })
}

/// Comment block placed at the top of generated source files.
fn file_header(values: &BTreeMap<String, String>) -> String {
    let get = |k: &str| values.get(k).map(String::as_str);
    let mut lines = vec!["//".to_string()];

    if let Some(file) = get(FILENAME) {
        lines.push(format!("//  {file}"));
    }
    if let Some(package) = get(PACKAGENAME).or(get(PROJECTNAME)) {
        lines.push(format!("//  {package}"));
    }
    lines.push("//".to_string());

    match (get(FULLUSERNAME), get(DATE)) {
        (Some(user), Some(date)) => lines.push(format!("//  Created by {user} on {date}.")),
        (Some(user), None) => lines.push(format!("//  Created by {user}.")),
        (None, Some(date)) => lines.push(format!("//  Created on {date}.")),
        (None, None) => {}
    }
    if let Some(copyright) = get(COPYRIGHT) {
        lines.push(format!("//  {copyright}"));
    }
    lines.push("//".to_string());

    lines.join("\n")
}
