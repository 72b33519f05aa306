// self
use crate::{_prelude::*, obs::FlowKind};

/// A span wrapper used by token flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth_credentials.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span until the returned guard drops.
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}
}

/// RAII guard returned by [`FlowSpan::entered`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}

/// Logs a lifecycle event (`cache_hit`, `cache_miss`, `acquire`, ...) at `debug`.
pub fn trace_event(kind: FlowKind, event: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), event, "token lifecycle event");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, event);
	}
}

/// Reports a cache failure that was swallowed so the surrounding flow could continue.
pub fn report_cache_failure(kind: FlowKind, stage: &'static str, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		let mut chain = error.to_string();
		let mut source = StdError::source(error);

		while let Some(cause) = source {
			chain.push_str(": ");
			chain.push_str(&cause.to_string());

			source = cause.source();
		}

		tracing::warn!(flow = kind.as_str(), stage, error = %chain, "credential cache unavailable");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage, error);
	}
}
