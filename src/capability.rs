//! Retrieval and pagination capabilities.
//!
//! An [`Entity`] is a [`Model`] with an API endpoint and a primary key. On
//! top of it, entities opt into:
//!
//! - [`Retrievable`]: fetch one entity by primary key,
//! - [`ListableByCursor`]: fetch a page of entities after a cursor.
//!
//! Both accept an optional [`IfModifiedSince`] condition. When one is sent and
//! the server answers `304 Not Modified`, the call returns `Ok(None)`.
//! Without a condition, a successful call always returns `Some`.

use crate::collection::Collection;
use crate::datetime::{self, to_naive_utc};
use crate::metadata::RequestMetadata;
use crate::schema::Model;
use crate::{Client, Error, Response, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use http::{Method, StatusCode};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

/// Page size used when the caller has no preference.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A model addressable through the API.
pub trait Entity: Model {
    /// The primary key type.
    type Key: fmt::Display + fmt::Debug + Clone + PartialEq;

    /// The endpoint path, relative to the API base URL.
    const ENDPOINT: &'static str;

    /// The primary key value.
    fn primary_key(&self) -> &Self::Key;

    /// The `Last-Modified` value of the response this entity was read from.
    fn last_modified(&self) -> Option<NaiveDateTime>;

    /// Stamps the `Last-Modified` value onto a freshly deserialized entity.
    #[doc(hidden)]
    fn with_last_modified(self, last_modified: Option<NaiveDateTime>) -> Self;
}

/// The point in time a conditional fetch compares against.
///
/// Built from a naive UTC timestamp, an aware date/time (converted to UTC)
/// or a previously fetched entity (its `last_modified`).
///
/// # Examples
///
/// ```no_run
/// use iconfinder::{Client, IfModifiedSince, License, Retrievable};
///
/// # async fn example() -> Result<(), iconfinder::Error> {
/// let client = Client::new()?;
/// let Some(license) = License::get(&client, &5, None).await? else {
///     unreachable!()
/// };
///
/// match License::get(&client, &5, Some(IfModifiedSince::from(&license))).await? {
///     Some(newer) => println!("changed: {}", newer.name()),
///     None => println!("unchanged"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub enum IfModifiedSince<'a, E> {
    /// An explicit naive UTC timestamp.
    Timestamp(NaiveDateTime),
    /// The `last_modified` of a previously fetched entity.
    Entity(&'a E),
}

impl<E: Entity> IfModifiedSince<'_, E> {
    /// The timestamp to send, if there is one.
    ///
    /// An entity that was never stamped yields `None`, and no conditional
    /// header is sent.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            IfModifiedSince::Timestamp(timestamp) => Some(*timestamp),
            IfModifiedSince::Entity(entity) => entity.last_modified(),
        }
    }
}

impl<E> From<NaiveDateTime> for IfModifiedSince<'_, E> {
    fn from(timestamp: NaiveDateTime) -> Self {
        IfModifiedSince::Timestamp(timestamp)
    }
}

impl<E, Tz: TimeZone> From<DateTime<Tz>> for IfModifiedSince<'_, E> {
    fn from(value: DateTime<Tz>) -> Self {
        IfModifiedSince::Timestamp(to_naive_utc(&value))
    }
}

impl<'a, E: Entity> From<&'a E> for IfModifiedSince<'a, E> {
    fn from(entity: &'a E) -> Self {
        IfModifiedSince::Entity(entity)
    }
}

/// A pagination cursor: the primary key of the last entity already seen.
pub enum Cursor<'a, E: Entity> {
    /// A previously fetched entity.
    Entity(&'a E),
    /// A raw primary key value.
    Key(E::Key),
}

impl<'a, E: Entity> Cursor<'a, E> {
    /// A cursor from a raw primary key value.
    pub fn key(key: impl Into<E::Key>) -> Self {
        Cursor::Key(key.into())
    }

    /// The token sent as the `after` query parameter.
    pub fn token(&self) -> String {
        match self {
            Cursor::Entity(entity) => entity.primary_key().to_string(),
            Cursor::Key(key) => key.to_string(),
        }
    }
}

impl<'a, E: Entity> From<&'a E> for Cursor<'a, E> {
    fn from(entity: &'a E) -> Self {
        Cursor::Entity(entity)
    }
}

impl<E: Entity> fmt::Debug for Cursor<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.token()).finish()
    }
}

/// An entity that can be fetched by primary key.
///
/// Requests `GET {ENDPOINT}/{id}`.
#[allow(async_fn_in_trait)]
pub trait Retrievable: Entity {
    /// Retrieves the entity with the given primary key.
    ///
    /// Returns `Ok(None)` only when `if_modified_since` produced a
    /// conditional header and the server answered `304 Not Modified`.
    ///
    /// # Errors
    ///
    /// - API errors per [`Error::from_response`],
    /// - [`Error::UnexpectedResponse`] for any other status below 400 that
    ///   is not `200 OK`,
    /// - [`Error::Schema`] if the payload does not match the schema,
    /// - [`Error::InvalidArgument`] if the condition cannot be expressed as
    ///   an HTTP date.
    async fn get<Q>(
        client: &Client,
        id: &Q,
        if_modified_since: Option<IfModifiedSince<'_, Self>>,
    ) -> Result<Option<Self>>
    where
        Self::Key: Borrow<Q>,
        Q: fmt::Display + ?Sized,
    {
        let request =
            RequestMetadata::new(Method::GET, Self::ENDPOINT).with_path_segment(id.to_string());
        let since = if_modified_since.and_then(|condition| condition.timestamp());

        let Some(response) = fetch(client, request, since).await? else {
            return Ok(None);
        };

        let entity = Self::deserialize(&response.json()?)?;
        Ok(Some(entity.with_last_modified(response.last_modified()?)))
    }

    /// Fetches this entity again, conditional on its `last_modified`.
    ///
    /// Returns `Ok(None)` when the server reports it unchanged.
    async fn refresh(&self, client: &Client) -> Result<Option<Self>> {
        Self::get(client, self.primary_key(), Some(IfModifiedSince::Entity(self))).await
    }
}

/// An entity whose collection can be paged with a cursor.
///
/// Requests `GET {ENDPOINT}?count={count}&after={cursor}` and reads the page
/// from the `COLLECTION_KEY` array of the response.
#[allow(async_fn_in_trait)]
pub trait ListableByCursor: Entity {
    /// The key of the entity array in a listing response.
    const COLLECTION_KEY: &'static str;

    /// Lists up to `count` entities following `after`.
    ///
    /// Every entity in the page carries the page's `Last-Modified` value.
    /// Returns `Ok(None)` only when `if_modified_since` produced a
    /// conditional header and the server answered `304 Not Modified`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `count` is zero; otherwise as
    /// [`Retrievable::get`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iconfinder::{Category, Client, Cursor, ListableByCursor};
    ///
    /// # async fn example() -> Result<(), iconfinder::Error> {
    /// let client = Client::new()?;
    /// let mut after = None;
    ///
    /// while let Some(page) = Category::list(&client, 20, after.map(Cursor::key), None).await? {
    ///     for category in &page {
    ///         println!("{}", category.identifier());
    ///     }
    ///     match page.last() {
    ///         Some(last) => after = Some(last.identifier().to_string()),
    ///         None => break,
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn list(
        client: &Client,
        count: u32,
        after: Option<Cursor<'_, Self>>,
        if_modified_since: Option<IfModifiedSince<'_, Self>>,
    ) -> Result<Option<Collection<Self>>> {
        if count < 1 {
            return Err(Error::InvalidArgument(format!(
                "count must be at least 1, got {count}"
            )));
        }

        let mut request =
            RequestMetadata::new(Method::GET, Self::ENDPOINT).with_query_param("count", count.to_string());
        if let Some(cursor) = &after {
            request = request.with_query_param("after", cursor.token());
        }
        let since = if_modified_since.and_then(|condition| condition.timestamp());

        let Some(response) = fetch(client, request, since).await? else {
            return Ok(None);
        };

        let payload = response.json()?;
        let collection =
            Collection::from_payload(&payload, Self::COLLECTION_KEY, response.last_modified()?)?;
        Ok(Some(collection))
    }
}

/// Sends `request`, conditional on `since`.
///
/// Returns `None` for `304 Not Modified` when a condition was sent.
async fn fetch(
    client: &Client,
    mut request: RequestMetadata,
    since: Option<NaiveDateTime>,
) -> Result<Option<Response>> {
    let conditional = since.is_some();
    if let Some(since) = since {
        let value = datetime::http_date(since)
            .map_err(|e| Error::InvalidArgument(format!("if_modified_since: {e}")))?;
        request = request.with_header("If-Modified-Since", value)?;
    }

    let path = request.path.clone();
    let response = client.send(request).await?;

    if conditional && response.is_not_modified() {
        tracing::debug!(path = %path, "Resource not modified");
        return Ok(None);
    }

    match response.status {
        StatusCode::OK => Ok(Some(response)),
        status => {
            tracing::warn!(
                path = %path,
                status = status.as_u16(),
                "Unexpected response status"
            );
            Err(Error::UnexpectedResponse { status })
        }
    }
}

/// An entity type bound to a client.
///
/// Created with [`Client::bind`]. Forwards to the capability methods so the
/// client does not have to be passed on every call.
pub struct Bound<'c, E> {
    client: &'c Client,
    entity: PhantomData<fn() -> E>,
}

impl<'c, E> Bound<'c, E> {
    pub(crate) fn new(client: &'c Client) -> Self {
        Self {
            client,
            entity: PhantomData,
        }
    }

    /// The bound client.
    pub fn client(&self) -> &'c Client {
        self.client
    }
}

impl<E> Clone for Bound<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Bound<'_, E> {}

impl<E: Retrievable> Bound<'_, E> {
    /// See [`Retrievable::get`].
    pub async fn get<Q>(
        &self,
        id: &Q,
        if_modified_since: Option<IfModifiedSince<'_, E>>,
    ) -> Result<Option<E>>
    where
        E::Key: Borrow<Q>,
        Q: fmt::Display + ?Sized,
    {
        E::get(self.client, id, if_modified_since).await
    }

    /// See [`Retrievable::refresh`].
    pub async fn refresh(&self, entity: &E) -> Result<Option<E>> {
        entity.refresh(self.client).await
    }
}

impl<E: ListableByCursor> Bound<'_, E> {
    /// See [`ListableByCursor::list`].
    pub async fn list(
        &self,
        count: u32,
        after: Option<Cursor<'_, E>>,
        if_modified_since: Option<IfModifiedSince<'_, E>>,
    ) -> Result<Option<Collection<E>>> {
        E::list(self.client, count, after, if_modified_since).await
    }

    /// Lists the first [`DEFAULT_PAGE_SIZE`] entities, unconditionally.
    pub async fn first_page(&self) -> Result<Collection<E>> {
        let page = E::list(self.client, DEFAULT_PAGE_SIZE, None, None).await?;
        // Without a condition the server never answers 304.
        page.ok_or(Error::UnexpectedResponse {
            status: StatusCode::NOT_MODIFIED,
        })
    }
}
