/// Pipeline stages reported while a chain is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    UnitComposition,
    BackboneAssembly,
    SidechainAttachment,
    Measurement,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "Validating input",
            Self::UnitComposition => "Composing backbone units",
            Self::BackboneAssembly => "Assembling backbone",
            Self::SidechainAttachment => "Attaching side chains",
            Self::Measurement => "Measuring internal coordinates",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    StageStart { stage: Stage, residues: usize },
    StageFinish { stage: Stage },

    BatchStart { chains: u64 },
    ChainFinished { chain: usize, ok: bool },
    BatchFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `f` between a start and finish event for `stage`. The finish event is only
    /// sent when `f` succeeds.
    pub(crate) fn stage<T, E>(
        &self,
        stage: Stage,
        residues: usize,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::StageStart { stage, residues });
        let result = f()?;
        self.report(Progress::StageFinish { stage });
        Ok(result)
    }
}
