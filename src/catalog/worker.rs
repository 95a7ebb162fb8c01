//! Background executor for catalog effects
//!
//! Each effect runs on its own tokio task and reports back through an
//! unbounded channel that the UI loop drains between frames. A new list
//! or detail fetch aborts the task it replaces; the controllers' sequence
//! numbers still guard against any completion that slips through.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{ApiError, MflixClient};
use crate::catalog::{DetailRequest, EditRequest, ListRequest};
use crate::models::{Comment, MovieDetail, PageResult, Session};

/// Completion of a background request
#[derive(Debug)]
pub enum CatalogEvent {
    List {
        seq: u64,
        result: Result<PageResult, ApiError>,
    },
    Detail {
        seq: u64,
        result: Result<MovieDetail, ApiError>,
    },
    Comments {
        seq: u64,
        result: Result<Vec<Comment>, ApiError>,
    },
    Edit {
        movie_id: String,
        result: Result<Option<MovieDetail>, ApiError>,
    },
    Login {
        result: Result<Session, ApiError>,
    },
    Register {
        result: Result<(), ApiError>,
    },
}

/// Spawns API calls and forwards their results
pub struct CatalogWorker {
    client: MflixClient,
    tx: mpsc::UnboundedSender<CatalogEvent>,
    list_task: Option<JoinHandle<()>>,
    detail_tasks: Vec<JoinHandle<()>>,
}

impl CatalogWorker {
    /// Worker plus the receiving end of its event channel
    pub fn new(client: MflixClient) -> (Self, mpsc::UnboundedReceiver<CatalogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            client,
            tx,
            list_task: None,
            detail_tasks: Vec::new(),
        };
        (worker, rx)
    }

    pub fn client(&self) -> &MflixClient {
        &self.client
    }

    /// Fetch a list page, aborting the previous list fetch
    pub fn fetch_list(&mut self, request: ListRequest) {
        self.cancel_list();
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.list_task = Some(tokio::spawn(async move {
            let result = client.list_movies(&request.params, &request.token).await;
            let _ = tx.send(CatalogEvent::List {
                seq: request.seq,
                result,
            });
        }));
    }

    /// Fetch a movie record and its comments concurrently
    pub fn fetch_detail(&mut self, request: DetailRequest) {
        self.cancel_detail();

        let client = self.client.clone();
        let tx = self.tx.clone();
        let DetailRequest {
            seq,
            movie_id,
            token,
        } = request;

        let (id, tok) = (movie_id.clone(), token.clone());
        self.detail_tasks.push(tokio::spawn(async move {
            let result = client.movie_detail(&id, &tok).await;
            let _ = tx.send(CatalogEvent::Detail { seq, result });
        }));

        let client = self.client.clone();
        let tx = self.tx.clone();
        self.detail_tasks.push(tokio::spawn(async move {
            let result = client.comments(&movie_id, &token).await;
            let _ = tx.send(CatalogEvent::Comments { seq, result });
        }));
    }

    /// Send a validated update. Saves are never aborted.
    pub fn submit_edit(&self, request: EditRequest) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client
                .update_movie(&request.movie_id, &request.update, &request.token)
                .await;
            let _ = tx.send(CatalogEvent::Edit {
                movie_id: request.movie_id,
                result,
            });
        });
    }

    pub fn login(&self, email: String, password: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.login(&email, &password).await;
            let _ = tx.send(CatalogEvent::Login { result });
        });
    }

    pub fn register(&self, name: String, email: String, password: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.register(&name, &email, &password).await;
            let _ = tx.send(CatalogEvent::Register { result });
        });
    }

    pub fn cancel_list(&mut self) {
        if let Some(task) = self.list_task.take() {
            task.abort();
        }
    }

    pub fn cancel_detail(&mut self) {
        for task in self.detail_tasks.drain(..) {
            task.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_list();
        self.cancel_detail();
    }
}

impl Drop for CatalogWorker {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
