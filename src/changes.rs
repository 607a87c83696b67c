use std::{future::Future, sync::Arc};

use futures::{StreamExt, stream::BoxStream};
use tokio::sync::watch;

use crate::error::AppResult;

/// Revision counter for one table. Writers bump it after every committed
/// change; observers re-run their query when it moves.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn notify(&self) {
        self.tx.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Emits the current result of `query`, then a fresh result after every
    /// change that alters it. Ends once every clone of the feed is dropped.
    pub fn observe<T, F, Fut>(&self, query: F) -> BoxStream<'static, AppResult<T>>
    where
        T: PartialEq + Clone + Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let state = Observation { rx: self.tx.subscribe(), query, last: None, primed: false };

        futures::stream::unfold(state, |mut st| async move {
            loop {
                if st.primed && st.rx.changed().await.is_err() {
                    return None;
                }
                st.primed = true;

                match (st.query)().await {
                    Ok(value) => {
                        if st.last.as_ref() == Some(&value) {
                            continue;
                        }
                        st.last = Some(value.clone());
                        return Some((Ok(value), st));
                    },
                    Err(err) => return Some((Err(err), st)),
                }
            }
        })
        .boxed()
    }
}

struct Observation<T, F> {
    rx: watch::Receiver<u64>,
    query: F,
    last: Option<T>,
    primed: bool,
}
