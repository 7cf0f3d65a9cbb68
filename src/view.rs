//! Screen controllers: the hero list, the detail editor, the dashboard and
//! the message panel. Each one is handed its collaborators on construction.

use tracing::debug;

use crate::core::HeroService;
use crate::message::MessageLog;
use crate::types::{Hero, HeroId};

/// Dashboard shows this slice of the fetched list.
const TOP_HEROES: std::ops::Range<usize> = 1..5;

pub struct HeroesView {
    service: HeroService,
    pub heroes: Vec<Hero>,
}

impl HeroesView {
    pub fn new(service: HeroService) -> Self {
        Self {
            service,
            heroes: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        self.heroes = self.service.list_heroes().await;
    }

    /// Create a hero from `name`. Blank names are ignored.
    pub async fn add(&mut self, name: &str) -> Option<&Hero> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let hero = self.service.add_hero(name).await?;
        self.heroes.push(hero);
        self.heroes.last()
    }

    /// Drops the hero locally right away, then asks the backend to delete it.
    /// Returns whether the backend acknowledged.
    pub async fn delete(&mut self, id: HeroId) -> bool {
        self.heroes.retain(|h| h.id != id);
        debug!(id, remaining = self.heroes.len(), "hero removed from list view");
        self.service.delete_hero(id).await
    }
}

pub struct HeroDetail {
    service: HeroService,
    pub hero: Option<Hero>,
}

impl HeroDetail {
    pub fn new(service: HeroService) -> Self {
        Self { service, hero: None }
    }

    pub async fn load(&mut self, id: HeroId) -> Option<&Hero> {
        self.hero = self.service.get_hero(id).await;
        self.hero.as_ref()
    }

    /// Edit the loaded hero's name locally. Returns `false` if nothing is loaded.
    pub fn rename(&mut self, name: &str) -> bool {
        match self.hero.as_mut() {
            Some(hero) => {
                name.clone_into(&mut hero.name);
                true
            }
            None => false,
        }
    }

    pub async fn save(&self) -> bool {
        match &self.hero {
            Some(hero) => self.service.update_hero(hero).await,
            None => false,
        }
    }
}

pub struct Dashboard {
    service: HeroService,
    pub heroes: Vec<Hero>,
}

impl Dashboard {
    pub fn new(service: HeroService) -> Self {
        Self {
            service,
            heroes: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        let all = self.service.list_heroes().await;
        self.heroes = top_heroes(&all).to_vec();
    }
}

fn top_heroes(all: &[Hero]) -> &[Hero] {
    let end = TOP_HEROES.end.min(all.len());
    all.get(TOP_HEROES.start..end).unwrap_or_default()
}

pub struct MessagesPanel {
    messages: MessageLog,
}

impl MessagesPanel {
    pub fn new(messages: MessageLog) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.messages()
    }

    pub fn clear(&self) {
        self.messages.clear();
    }
}
