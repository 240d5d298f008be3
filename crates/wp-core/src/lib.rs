pub mod category;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod model;
pub mod serialize;

pub use category::{Category, category_for_type, compatible};
pub use geometry::Point;
pub use graph::{
    CREATE_DEBOUNCE_MS, ChannelInfo, Clock, CreateError, CreateOptions, PanelConnection,
    SystemClock, TopologyEvent, TopologyGraph,
};
pub use id::{ConnectionId, DeviceId};
pub use model::{
    Channel, Connection, ConnectionProps, CustomTextLabel, DEFAULT_COLOR, DEFAULT_KIND,
    DeviceQuery, DeviceRef,
};
pub use serialize::{ConnectionRecord, DeviceResolver, LabelRecord, PropsRecord};
