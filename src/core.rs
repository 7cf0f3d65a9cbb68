//! Hero data client.
//!
//! Every backend operation exists twice: a `try_*` form that returns
//! `Result<_, HeroError>` and leaves the message log alone, and a fail-soft
//! form that records the outcome in the [`MessageLog`] and turns failures into
//! a fallback value. Callers of the fail-soft form never see an error.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, error};

use crate::api::{api_hero, api_hero_search, api_heroes};
use crate::config::HeroConfig;
use crate::error::HeroError;
use crate::message::MessageLog;
use crate::search::HeroSearch;
use crate::types::{Hero, HeroId, NewHero};

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct HeroService {
    client: Client,
    base_url: String,
    messages: MessageLog,
}

impl HeroService {
    pub fn new(config: &HeroConfig, messages: MessageLog) -> Result<Self, HeroError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, &config.base_url, messages))
    }

    pub fn with_client(client: Client, base_url: &str, messages: MessageLog) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            messages,
        }
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn try_list_heroes(&self) -> Result<Vec<Hero>, HeroError> {
        let heroes = self
            .client
            .get(api_heroes(&self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Hero>>()
            .await?;
        Ok(heroes)
    }

    pub async fn try_get_hero(&self, id: HeroId) -> Result<Hero, HeroError> {
        let hero = self
            .client
            .get(api_hero(&self.base_url, id))
            .send()
            .await?
            .error_for_status()?
            .json::<Hero>()
            .await?;
        Ok(hero)
    }

    /// Full replace of the record identified by `hero.id`. The response body is ignored.
    pub async fn try_update_hero(&self, hero: &Hero) -> Result<(), HeroError> {
        self.client
            .put(api_heroes(&self.base_url))
            .header(CONTENT_TYPE, JSON)
            .json(hero)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn try_add_hero(&self, hero: &NewHero) -> Result<Hero, HeroError> {
        let created = self
            .client
            .post(api_heroes(&self.base_url))
            .header(CONTENT_TYPE, JSON)
            .json(hero)
            .send()
            .await?
            .error_for_status()?
            .json::<Hero>()
            .await?;
        Ok(created)
    }

    pub async fn try_delete_hero(&self, id: HeroId) -> Result<(), HeroError> {
        self.client
            .delete(api_hero(&self.base_url, id))
            .header(CONTENT_TYPE, JSON)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Name query. Blank terms resolve to an empty list without a request.
    pub async fn try_search_heroes(&self, term: &str) -> Result<Vec<Hero>, HeroError> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let heroes = self
            .client
            .get(api_hero_search(&self.base_url))
            .query(&[("name", term)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Hero>>()
            .await?;
        Ok(heroes)
    }

    pub async fn list_heroes(&self) -> Vec<Hero> {
        match self.try_list_heroes().await {
            Ok(heroes) => {
                self.log("fetched heroes");
                heroes
            }
            Err(e) => self.handle_error("getHeroes", &e, Vec::new()),
        }
    }

    pub async fn get_hero(&self, id: HeroId) -> Option<Hero> {
        match self.try_get_hero(id).await {
            Ok(hero) => {
                self.log(format!("fetched hero id={id}"));
                Some(hero)
            }
            Err(e) => self.handle_error(&format!("getHero id={id}"), &e, None),
        }
    }

    /// Returns `true` once the backend acknowledged the update.
    pub async fn update_hero(&self, hero: &Hero) -> bool {
        match self.try_update_hero(hero).await {
            Ok(()) => {
                self.log(format!("update hero id={}", hero.id));
                true
            }
            Err(e) => self.handle_error("updateHero", &e, false),
        }
    }

    pub async fn add_hero(&self, name: &str) -> Option<Hero> {
        match self.try_add_hero(&NewHero::new(name)).await {
            Ok(hero) => {
                self.log(format!("added hero w/ id={}", hero.id));
                Some(hero)
            }
            Err(e) => self.handle_error("addHero", &e, None),
        }
    }

    /// Returns `true` once the backend acknowledged the delete.
    pub async fn delete_hero(&self, id: HeroId) -> bool {
        match self.try_delete_hero(id).await {
            Ok(()) => {
                self.log(format!("deleted hero id={id}"));
                true
            }
            Err(e) => self.handle_error("deleteHero", &e, false),
        }
    }

    pub async fn search_heroes(&self, term: &str) -> Vec<Hero> {
        if term.trim().is_empty() {
            return Vec::new();
        }
        match self.try_search_heroes(term).await {
            Ok(heroes) => {
                if heroes.is_empty() {
                    self.log(format!("no heroes matching {term}"));
                } else {
                    self.log(format!("found heroes matching {term}"));
                }
                heroes
            }
            Err(e) => self.handle_error("searchHeroes", &e, Vec::new()),
        }
    }

    fn handle_error<T>(&self, operation: &str, err: &HeroError, fallback: T) -> T {
        error!(operation, error = %err, "hero backend call failed");
        self.log(format!("{operation} failed: {err}"));
        fallback
    }

    fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        debug!(entry = message, "hero service log");
        self.messages.add(format!("HeroService: {message}"));
    }
}

impl HeroSearch for HeroService {
    async fn search(&self, term: &str) -> Vec<Hero> {
        self.search_heroes(term).await
    }
}
