//! 线上模型 → 本地实体

use crate::api::models::RemotePeriod;
use crate::storage::entities::Period;

pub fn map_period(remote: &RemotePeriod) -> Period {
    Period {
        id: remote.id,
        level: remote.level,
        number: remote.number,
        current: remote.current,
        last: remote.last,
        start: remote.start.date,
        end: remote.end.date,
    }
}

impl From<&RemotePeriod> for Period {
    fn from(remote: &RemotePeriod) -> Self {
        map_period(remote)
    }
}
