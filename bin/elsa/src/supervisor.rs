use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

type WorkFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;
type Work<E> = Box<dyn FnMut() -> WorkFuture<E> + Send>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Created,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug)]
pub enum Error<E> {
    InvalidState(State),
    Work(E),
    Join(JoinError),
}

/// Runs one unit of work over and over on a background task until stopped.
///
/// Stopping is cooperative: the in-flight call is dropped at its next
/// suspension point and the work is never invoked again. An error returned by
/// the work ends the loop and is handed to whoever awaits [`stop`] or
/// [`finished`].
///
/// [`stop`]: Supervisor::stop
/// [`finished`]: Supervisor::finished
pub struct Supervisor<E> {
    state: State,
    work: Option<Work<E>>,
    token: CancellationToken,
    handle: Option<JoinHandle<Result<(), E>>>,
}

impl<E: Send + 'static> Supervisor<E> {
    pub fn new<F, A, Fut>(work: F, args: A) -> Self
    where
        F: Fn(A) -> Fut + Send + 'static,
        A: Clone + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let work: Work<E> = Box::new(move || Box::pin(work(args.clone())));

        Self {
            state: State::Created,
            work: Some(work),
            token: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn start(&mut self) -> Result<(), Error<E>> {
        let work = match (self.state, self.work.take()) {
            (State::Created, Some(work)) => work,
            (state, _) => return Err(Error::InvalidState(state)),
        };

        self.handle = Some(tokio::spawn(run(work, self.token.clone())));
        self.state = State::Running;

        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Error<E>> {
        match self.state {
            State::Created => {
                self.work = None;
                self.state = State::Stopped;
                return Ok(());
            }
            State::Stopped => return Ok(()),
            State::Running | State::Stopping => (),
        }

        self.state = State::Stopping;
        self.token.cancel();

        self.finished().await
    }

    /// Waits for the background task to end without asking it to stop.
    pub async fn finished(&mut self) -> Result<(), Error<E>> {
        let handle = match self.handle.as_mut() {
            Some(handle) => handle,
            None if self.state == State::Stopped => return Ok(()),
            None => return Err(Error::InvalidState(self.state)),
        };

        let result = handle.await;

        self.handle = None;
        self.state = State::Stopped;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(Error::Work(err)),
            Err(err) => Err(Error::Join(err)),
        }
    }
}

async fn run<E>(mut work: Work<E>, token: CancellationToken) -> Result<(), E> {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            result = work() => result?,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState(state) => write!(f, "invalid supervisor state {state:?}"),
            Self::Work(err) => write!(f, "{err}"),
            Self::Join(err) => write!(f, "join error: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct Fatal(usize);

    impl fmt::Display for Fatal {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fatal after {} calls", self.0)
        }
    }

    async fn nap(duration: Duration) -> Result<(), Fatal> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut supervisors = (0..4)
            .map(|_| Supervisor::new(nap, Duration::from_secs(3)))
            .collect::<Vec<_>>();

        for supervisor in supervisors.iter_mut() {
            assert_eq!(supervisor.state(), State::Created);
            supervisor.start().unwrap();
            assert_eq!(supervisor.state(), State::Running);
        }

        for supervisor in supervisors.iter_mut() {
            supervisor.stop().await.unwrap();
            assert_eq!(supervisor.state(), State::Stopped);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_invoked_after_stop() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let mut supervisor = Supervisor::new(
            move |duration: Duration| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(duration).await;
                    Ok::<_, Fatal>(())
                }
            },
            Duration::from_secs(1),
        );

        supervisor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;

        supervisor.stop().await.unwrap();
        let stopped_at = calls.load(Ordering::SeqCst);
        assert_eq!(stopped_at, 4);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn test_work_error_is_fatal() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let mut supervisor = Supervisor::new(
            move |limit: usize| {
                let counter = counter.clone();
                async move {
                    let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if call == limit {
                        Err(Fatal(call))
                    } else {
                        tokio::task::yield_now().await;
                        Ok(())
                    }
                }
            },
            3,
        );

        supervisor.start().unwrap();

        let error = supervisor.finished().await.unwrap_err();
        assert!(matches!(error, Error::Work(Fatal(3))));
        assert_eq!(supervisor.state(), State::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        supervisor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_reports_error() {
        let mut supervisor = Supervisor::new(|_: ()| async { Err::<(), _>(Fatal(1)) }, ());

        supervisor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let error = supervisor.stop().await.unwrap_err();
        assert!(matches!(error, Error::Work(Fatal(1))));
    }

    #[tokio::test]
    async fn test_start_twice() {
        let mut supervisor = Supervisor::new(nap, Duration::from_millis(10));

        supervisor.start().unwrap();
        let error = supervisor.start().unwrap_err();
        assert!(matches!(error, Error::InvalidState(State::Running)));

        supervisor.stop().await.unwrap();

        let error = supervisor.start().unwrap_err();
        assert!(matches!(error, Error::InvalidState(State::Stopped)));
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let mut supervisor = Supervisor::new(nap, Duration::from_millis(10));

        supervisor.stop().await.unwrap();
        assert_eq!(supervisor.state(), State::Stopped);

        assert!(supervisor.finished().await.is_ok());
    }

    #[tokio::test]
    async fn test_finished_before_start() {
        let mut supervisor = Supervisor::new(nap, Duration::from_millis(10));

        let error = supervisor.finished().await.unwrap_err();
        assert!(matches!(error, Error::InvalidState(State::Created)));
    }
}
