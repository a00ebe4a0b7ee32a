//! Background tasks on native and WASM.
//!
//! Natively, reqwest needs a Tokio runtime, which `bevy_tokio_tasks`
//! provides. In the browser reqwest uses `fetch`, and Bevy's
//! `AsyncComputeTaskPool` is enough to drive it.
//!
//! Tasks never touch the world. [`TaskSpawner::deliver`] runs a future off
//! the main thread and hands its output back over an `async_channel`; a
//! system drains the receiver each frame.

use std::future::Future;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Installs the platform's async runtime.
pub struct AsyncRuntimePlugin;

impl Plugin for AsyncRuntimePlugin {
    fn build(&self, app: &mut App) {
        #[cfg(target_family = "wasm")]
        let _ = app;

        #[cfg(not(target_family = "wasm"))]
        app.add_plugins(bevy_tokio_tasks::TokioTasksPlugin::default());
    }
}

/// `Send` where tasks may move between threads; no bound in the browser,
/// where reqwest's futures are not `Send`.
#[cfg(not(target_family = "wasm"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_family = "wasm"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_family = "wasm")]
pub trait MaybeSend {}
#[cfg(target_family = "wasm")]
impl<T> MaybeSend for T {}

/// Runs futures on the platform's runtime.
#[derive(SystemParam)]
pub struct TaskSpawner<'w, 's> {
    #[cfg(not(target_family = "wasm"))]
    runtime: Res<'w, bevy_tokio_tasks::TokioTasksRuntime>,
    #[cfg(target_family = "wasm")]
    _runtime: std::marker::PhantomData<&'w ()>,
    #[allow(dead_code)]
    _local: Local<'s, ()>,
}

impl TaskSpawner<'_, '_> {
    /// Run `future` in the background and send its output on `tx`.
    pub fn deliver<T, F>(&self, future: F, tx: async_channel::Sender<T>)
    where
        T: MaybeSend + 'static,
        F: Future<Output = T> + MaybeSend + 'static,
    {
        self.detach(send_output(future, tx));
    }

    #[cfg(not(target_family = "wasm"))]
    fn detach<F>(&self, task: F)
    where
        F: Future<Output = ()> + MaybeSend + 'static,
    {
        self.runtime.spawn_background_task(move |_ctx| task);
    }

    #[cfg(target_family = "wasm")]
    #[allow(clippy::unused_self)]
    fn detach<F>(&self, task: F)
    where
        F: Future<Output = ()> + MaybeSend + 'static,
    {
        bevy::tasks::AsyncComputeTaskPool::get()
            .spawn_local(task)
            .detach();
    }
}

/// Await `future` and send its output on `tx`.
///
/// A closed receiver only means nobody is listening any more, so the send
/// error is dropped.
async fn send_output<T, F>(future: F, tx: async_channel::Sender<T>)
where
    F: Future<Output = T>,
{
    let output = future.await;
    if tx.send(output).await.is_err() {
        tracing::debug!("background task finished after its receiver closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_sent() {
        let (tx, rx) = async_channel::bounded(1);
        bevy::tasks::block_on(send_output(async { 7_u32 }, tx));
        assert_eq!(rx.try_recv().ok(), Some(7));
    }

    #[test]
    fn test_closed_receiver_is_tolerated() {
        let (tx, rx) = async_channel::bounded::<u32>(1);
        drop(rx);
        bevy::tasks::block_on(send_output(async { 7_u32 }, tx));
    }
}
