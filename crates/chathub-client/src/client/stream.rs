//! Turn driver and challenge recovery.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use chathub_common::TurnId;

use super::{ChatHubClient, EventStream};
use crate::transport::build_turn_request;
use crate::{
    AskOptions, ChatHubError, Challenge, Conversation, Event, EventTranslator, RawFrame,
    TurnContext,
};

/// Smallest bounded capacity; keeps backpressure end to end.
const EVENT_CHANNEL_CAPACITY: usize = 1;
const FRAME_CHANNEL_CAPACITY: usize = 1;

/// Automatic challenge recoveries allowed per `ask_stream` call.
pub(crate) const MAX_CHALLENGE_RECOVERIES: u32 = 1;

const RESOLVING_MESSAGE: &str = "Please wait patiently while we are resolving the CAPTCHA...";

/// How one attempt at a turn ended.
#[derive(Debug)]
enum TurnOutcome {
    /// Terminal frame, end of stream, cancellation or a departed consumer.
    Done,
    /// A fatal error not yet forwarded to the caller.
    Failed(ChatHubError),
}

impl ChatHubClient {
    /// Start a turn.
    ///
    /// Negotiates the conversation before returning, so negotiation
    /// failures surface here. Everything after that arrives on the
    /// returned stream. A turn cancelled before it starts yields a stream
    /// that closes without events.
    pub async fn ask_stream(&self, options: AskOptions) -> Result<EventStream, ChatHubError> {
        let (events, stream) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        if options.cancel.is_cancelled() {
            debug!("Turn cancelled before negotiation");
            return Ok(stream);
        }

        info!("Creating conversation for new turn");
        let conversation = self.negotiator.create().await?;

        if options.cancel.is_cancelled() {
            debug!("Turn cancelled after negotiation");
            return Ok(stream);
        }

        let client = self.clone();
        tokio::spawn(async move {
            client.drive(options, conversation, events).await;
            info!("Turn event stream closed");
        });
        Ok(stream)
    }

    /// Run the turn, recovering from at most [`MAX_CHALLENGE_RECOVERIES`]
    /// challenges by re-negotiating and re-running it.
    async fn drive(
        &self,
        mut options: AskOptions,
        mut conversation: Conversation,
        events: mpsc::Sender<Event>,
    ) {
        let mut recoveries = 0;
        loop {
            let turn_id = options.turn_id.get_or_insert_with(TurnId::new).clone();
            let conversation_id = conversation.conversation_id.clone();

            let err = match self.run_turn(&options, conversation, &turn_id, &events).await {
                TurnOutcome::Done => return,
                TurnOutcome::Failed(err) => err,
            };
            if options.cancel.is_cancelled() {
                debug!(error = %err, "Dropping error observed after cancellation");
                return;
            }

            let recoverable = err.is_challenge()
                && !options.disable_captcha_recovery
                && recoveries < MAX_CHALLENGE_RECOVERIES;
            if !recoverable {
                error!(error = %err, "Turn failed");
                emit(&events, Event::Error(err), &options.cancel).await;
                return;
            }
            recoveries += 1;

            info!(conversation_id = %conversation_id, "Challenge detected, resolving");
            if !emit(
                &events,
                Event::ResolvingCaptcha(RESOLVING_MESSAGE.into()),
                &options.cancel,
            )
            .await
            {
                return;
            }

            let challenge = Challenge {
                conversation_id,
                turn_id,
            };
            let resolver = Arc::clone(self.resolver());
            if let Err(err) = resolver.resolve(&challenge, &options.cancel).await {
                if options.cancel.is_cancelled() || err == ChatHubError::Cancelled {
                    debug!("Challenge resolution cancelled");
                    return;
                }
                warn!(error = %err, "Automatic challenge resolution failed");
                emit(
                    &events,
                    Event::Error(ChatHubError::RecoveryFailed(err.to_string())),
                    &options.cancel,
                )
                .await;
                return;
            }

            info!("Challenge resolved, retrying turn");
            options = options.for_recovery_retry();
            if options.cancel.is_cancelled() {
                return;
            }
            conversation = match self.negotiator.create().await {
                Ok(conversation) => conversation,
                Err(err) => {
                    if !options.cancel.is_cancelled() {
                        error!(error = %err, "Conversation creation failed on retry");
                        emit(&events, Event::Error(err), &options.cancel).await;
                    }
                    return;
                }
            };
        }
    }

    /// One negotiated attempt: socket session plus translation.
    async fn run_turn(
        &self,
        options: &AskOptions,
        conversation: Conversation,
        turn_id: &TurnId,
        events: &mpsc::Sender<Event>,
    ) -> TurnOutcome {
        let profile = self.profile_for(options.style);
        let request = match build_turn_request(&profile, &conversation, options, turn_id) {
            Ok(request) => request,
            Err(err) => return TurnOutcome::Failed(err),
        };

        let session_cancel = options.cancel.child_token();
        let (frames_tx, mut frames) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let transport = Arc::clone(&self.transport);
        let turn = TurnContext {
            conversation,
            request,
            cancel: session_cancel.clone(),
        };
        let session = tokio::spawn(async move { transport.run(turn, frames_tx).await });

        let mut translator = EventTranslator::new(options.prompt.as_str());
        let outcome = 'turn: loop {
            let frame = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => break TurnOutcome::Done,
                frame = frames.recv() => frame,
            };
            let translation = match frame {
                None => break TurnOutcome::Done,
                Some(RawFrame::Error(err)) => break TurnOutcome::Failed(err),
                Some(RawFrame::Data(frame)) => translator.translate(&frame),
            };
            for event in translation.events {
                if let Event::Error(err) = event {
                    break 'turn TurnOutcome::Failed(err);
                }
                if !emit(events, event, &options.cancel).await {
                    break 'turn TurnOutcome::Done;
                }
            }
            if translation.finished {
                break TurnOutcome::Done;
            }
        };

        session_cancel.cancel();
        drop(frames);
        if let Err(e) = session.await {
            warn!(error = %e, "Transport task ended abnormally");
        }
        debug!(cursor = translator.cursor(), "Turn attempt finished");
        outcome
    }
}

/// Deliver one event. `false` when cancelled or the caller hung up.
async fn emit(events: &mpsc::Sender<Event>, event: Event, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = events.send(event) => sent.is_ok(),
    }
}
