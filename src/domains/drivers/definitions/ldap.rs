//! Directory (LDAP) driver.
//!
//! Each lookup opens a fresh connection, binds with the service account,
//! searches the subtree under the base DN for exactly one entry whose user
//! attribute matches the identifier's user name, and renders the requested
//! attributes through the configured template. Nothing is kept between
//! calls.

use async_trait::async_trait;
use ldap3::{DerefAliases, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::render_resource;
use crate::core::config::LdapConfig;
use crate::domains::drivers::{
    AttributeMap, BackendError, Driver, DriverError, IdentifierPolicy, Render, TemplateError,
    TemplateRenderer,
};
use crate::domains::resources::Resource;

// ============================================================================
// Directory client seam
// ============================================================================

/// A search result entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryEntry {
    /// Distinguished name.
    pub dn: String,

    /// Attribute values by attribute name.
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// First value of an attribute, matched case-insensitively.
    ///
    /// Missing attributes yield the empty string.
    pub fn first_value(&self, name: &str) -> &str {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// One open directory session.
#[async_trait]
pub trait DirectoryClient: Send {
    /// Simple bind with a DN and password.
    async fn bind(&mut self, user: &str, password: &str) -> Result<(), BackendError>;

    /// Subtree search under `base`, never dereferencing aliases.
    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, BackendError>;

    /// Unbind and drop the session.
    async fn close(&mut self) -> Result<(), BackendError>;
}

/// Opens directory sessions.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Open a new session.
    async fn connect(&self) -> Result<Box<dyn DirectoryClient>, BackendError>;
}

// ============================================================================
// ldap3-backed implementation
// ============================================================================

/// Connector opening `ldap3` sessions against a server URL.
#[derive(Debug, Clone)]
pub struct LdapConnector {
    url: String,
    timeout: Duration,
}

impl LdapConnector {
    /// Create a connector for `url` with a connect and per-operation timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(&self) -> Result<Box<dyn DirectoryClient>, BackendError> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.url)
            .await
            .map_err(|e| BackendError::directory(format!("cannot connect to {}: {e}", self.url)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection error: {}", e);
            }
        });

        Ok(Box::new(LdapSession {
            ldap,
            timeout: self.timeout,
        }))
    }
}

/// An open `ldap3` session.
struct LdapSession {
    ldap: ldap3::Ldap,
    timeout: Duration,
}

fn directory_error(e: ldap3::LdapError) -> BackendError {
    BackendError::directory(e.to_string())
}

#[async_trait]
impl DirectoryClient for LdapSession {
    async fn bind(&mut self, user: &str, password: &str) -> Result<(), BackendError> {
        self.ldap
            .with_timeout(self.timeout)
            .simple_bind(user, password)
            .await
            .and_then(|result| result.success())
            .map_err(directory_error)?;
        Ok(())
    }

    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, BackendError> {
        let (entries, _) = self
            .ldap
            .with_timeout(self.timeout)
            .with_search_options(SearchOptions::new().deref(DerefAliases::Never))
            .search(base, Scope::Subtree, filter, attributes.to_vec())
            .await
            .and_then(|result| result.success())
            .map_err(directory_error)?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let entry = SearchEntry::construct(entry);
                DirectoryEntry {
                    dn: entry.dn,
                    attrs: entry.attrs,
                }
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.ldap.unbind().await.map_err(directory_error)
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Driver resolving identifiers against a directory service.
pub struct LdapDriver {
    config: LdapConfig,
    timeout: Duration,
    policy: IdentifierPolicy,
    renderer: Arc<dyn Render>,
    connector: Arc<dyn DirectoryConnector>,
}

impl LdapDriver {
    /// Discriminator selecting this driver.
    pub const NAME: &'static str = "ldap";

    /// Create a driver from settings, compiling its template.
    pub fn new(config: LdapConfig, policy: IdentifierPolicy) -> Result<Self, TemplateError> {
        let renderer = TemplateRenderer::from_file(&config.template)?;
        let connector = LdapConnector::new(&config.url, Duration::from_secs(config.timeout_secs));

        Ok(Self::with_parts(
            config,
            policy,
            Arc::new(renderer),
            Arc::new(connector),
        ))
    }

    /// Create a driver from explicit parts.
    pub fn with_parts(
        config: LdapConfig,
        policy: IdentifierPolicy,
        renderer: Arc<dyn Render>,
        connector: Arc<dyn DirectoryConnector>,
    ) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            config,
            policy,
            renderer,
            connector,
        }
    }

    /// The search filter for a user name.
    ///
    /// `(<user_attr>=<user>)`, conjoined with the configured filter clause
    /// when there is one. The user name is escaped.
    pub fn search_filter(&self, user: &str) -> String {
        let user_filter = format!("({}={})", self.config.user_attr, ldap3::ldap_escape(user));

        match self.config.filter.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => {
                if extra.starts_with('(') {
                    format!("(&{extra}{user_filter})")
                } else {
                    format!("(&({extra}){user_filter})")
                }
            }
            _ => user_filter,
        }
    }

    /// Bind, search and collect the configured attributes of the single match.
    async fn fetch_attributes(
        &self,
        client: &mut dyn DirectoryClient,
        identifier: &str,
        user: &str,
    ) -> Result<AttributeMap, DriverError> {
        let password = self.config.bind_pass.as_deref().unwrap_or_default();
        client
            .bind(&self.config.bind_user, password)
            .await
            .map_err(|e| DriverError::resolution(identifier, e))?;

        let filter = self.search_filter(user);
        debug!("Searching {} for {}", self.config.base_dn, filter);

        let mut entries = client
            .search(&self.config.base_dn, &filter, &self.config.attributes)
            .await
            .map_err(|e| DriverError::resolution(identifier, e))?;

        let entry = match entries.len() {
            0 => return Err(DriverError::not_found(identifier)),
            1 => entries.remove(0),
            found => {
                warn!("Search for {} matched {} entries", filter, found);
                return Err(DriverError::resolution(
                    identifier,
                    BackendError::Ambiguous { found },
                ));
            }
        };

        Ok(self
            .config
            .attributes
            .iter()
            .map(|name| (name.clone(), entry.first_value(name).to_string()))
            .collect())
    }
}

#[async_trait]
impl Driver for LdapDriver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[instrument(skip(self))]
    async fn resolve(&self, identifier: &str) -> Result<Resource, DriverError> {
        let user = self
            .policy
            .directory_key(identifier)
            .ok_or_else(|| DriverError::not_found(identifier))?;

        let mut client = tokio::time::timeout(self.timeout, self.connector.connect())
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))
            .and_then(|client| client)
            .map_err(|e| DriverError::resolution(identifier, e))?;

        let attributes = tokio::time::timeout(
            self.timeout,
            self.fetch_attributes(client.as_mut(), identifier, user),
        )
        .await
        .unwrap_or_else(|_| {
            Err(DriverError::resolution(
                identifier,
                BackendError::Timeout(self.timeout),
            ))
        });

        if let Err(e) = client.close().await {
            debug!("Error closing directory session: {}", e);
        }

        render_resource(self.renderer.as_ref(), identifier, &attributes?)
    }
}
